//! Per-frame delta log command.

use super::{InputOpts, LogDir};
use anyhow::Context;
use clap::Args;
use console::style;
use formatscan_detect::DeltaEngine;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Summary printed in JSON mode.
#[derive(Debug, Clone, Serialize)]
struct DeltasSummary {
    /// Frames processed.
    frames: u64,
    /// Mean gamma across the stream.
    mean_gamma: f32,
    /// Path of the CSV log, if kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<PathBuf>,
}

/// Compute per-frame deltas and write a CSV log.
#[derive(Args, Debug)]
pub struct CmdDeltas {
    #[command(flatten)]
    input: InputOpts,

    /// Directory for the CSV log (default: a temporary directory).
    #[arg(short = 'y', long)]
    log_dir: Option<PathBuf>,

    /// Keep the log directory after the run.
    #[arg(long)]
    keep_logs: bool,

    /// Output a JSON summary instead of human-readable text.
    #[arg(long)]
    json: bool,
}

impl CmdDeltas {
    /// Execute the deltas command.
    pub fn run(self, verbose: bool) -> anyhow::Result<()> {
        let mut stream = self.input.open()?;
        let engine = DeltaEngine::new();

        let log_dir = LogDir::create(self.log_dir.as_deref())?;
        let log_path = log_dir.path().join(format!("{}.csv", self.input.input_stem()));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("cannot create log file {log_path:?}"))?;
        let mut log = BufWriter::new(file);
        writeln!(log, "delta_frame,delta_even,delta_odd,gamma")?;

        let mut buf = vec![0u8; stream.frame_size()];
        let luma_size = stream.luma_size();
        let res = stream.res();

        let mut frames = 0u64;
        let mut gamma_total = 0.0f64;

        if verbose {
            eprint!("Processing:\n  >");
        }

        while stream.read_frame(&mut buf)? {
            let report = engine.deltas(&buf[..luma_size], res)?;
            writeln!(
                log,
                "{:8.5},{:8.5},{:8.5},{:8.5}",
                report.frame, report.even, report.odd, report.gamma
            )?;
            gamma_total += report.gamma as f64;
            frames += 1;

            if verbose && frames % 10 == 0 {
                eprint!(".");
            }
        }
        log.flush()?;

        if verbose {
            eprintln!("<");
            eprintln!("=> {frames} frames processed");
        }

        let mean_gamma = if frames == 0 {
            0.0
        } else {
            (gamma_total / frames as f64) as f32
        };

        // Temporary logs are kept only on request or in verbose runs.
        let kept = self.keep_logs || verbose || self.log_dir.is_some();
        let kept_log = if kept {
            let dir = log_dir.keep();
            Some(dir.join(format!("{}.csv", self.input.input_stem())))
        } else {
            None
        };

        if self.json {
            let summary = DeltasSummary {
                frames,
                mean_gamma,
                log: kept_log,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{frames} frames, mean gamma {mean_gamma:.5}");
            if let Some(path) = &kept_log {
                println!("delta log: {}", style(path.display()).cyan());
            }
        }

        Ok(())
    }
}
