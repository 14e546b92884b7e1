//! Single-frame interlace histogram command.

use super::{InputOpts, LogDir};
use anyhow::{bail, Context};
use clap::Args;
use console::style;
use formatscan_detect::InterlaceDetector;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Build the field-difference histogram for one frame.
#[derive(Args, Debug)]
pub struct CmdInterlace {
    #[command(flatten)]
    input: InputOpts,

    /// Frame index to analyze.
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Directory for the histogram CSV (default: a temporary directory).
    #[arg(short = 'y', long)]
    log_dir: Option<PathBuf>,

    /// Keep the log directory after the run.
    #[arg(long)]
    keep_logs: bool,

    /// Output the full analysis as JSON instead of text + CSV.
    #[arg(long)]
    json: bool,
}

impl CmdInterlace {
    /// Execute the interlace command.
    pub fn run(self, verbose: bool) -> anyhow::Result<()> {
        let mut stream = self.input.open()?;
        let detector = InterlaceDetector::new();

        let mut buf = vec![0u8; stream.frame_size()];
        for skipped in 0..=self.frame {
            if !stream.read_frame(&mut buf)? {
                bail!(
                    "stream ended after {skipped} frames, cannot analyze frame {}",
                    self.frame
                );
            }
        }

        let luma_size = stream.luma_size();
        let analysis = detector.analyze(&buf[..luma_size], stream.res())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            return Ok(());
        }

        let log_dir = LogDir::create(self.log_dir.as_deref())?;
        let log_path = log_dir
            .path()
            .join(format!("{}_f{}.csv", self.input.input_stem(), self.frame));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("cannot create log file {log_path:?}"))?;
        let mut log = BufWriter::new(file);

        writeln!(
            log,
            "Average even and odd field difference in current frame: {:.5}",
            analysis.histogram.mean()
        )?;
        writeln!(log, "fd_origin,bin,dist_percent,count")?;
        for row in analysis.histogram.rows() {
            writeln!(
                log,
                "{:8.5},{:3},{:9.5},{:7}",
                row.field_diff, row.bin, row.percent, row.count
            )?;
        }
        log.flush()?;

        println!(
            "frame {}: mean field difference {:.5}, gamma {:.5}",
            self.frame,
            analysis.histogram.mean(),
            analysis.deltas.gamma
        );

        let kept = self.keep_logs || verbose || self.log_dir.is_some();
        if kept {
            let dir = log_dir.keep();
            let path = dir.join(format!("{}_f{}.csv", self.input.input_stem(), self.frame));
            println!("histogram log: {}", style(path.display()).cyan());
        }

        Ok(())
    }
}
