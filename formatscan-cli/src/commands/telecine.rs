//! Stream-wide telecine detection command.

use super::InputOpts;
use clap::Args;
use console::style;
use formatscan_detect::{TelecineDetector, TelecineVerdict, PATTERN_LENGTH};

/// Detect a telecine cadence across the whole stream.
#[derive(Args, Debug)]
pub struct CmdTelecine {
    #[command(flatten)]
    input: InputOpts,

    /// Output the full report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl CmdTelecine {
    /// Execute the telecine command.
    pub fn run(self, verbose: bool) -> anyhow::Result<()> {
        let mut stream = self.input.open()?;
        let mut detector = TelecineDetector::new(stream.res())?;

        let mut cur = vec![0u8; stream.frame_size()];
        let mut prev = vec![0u8; stream.frame_size()];
        let luma_size = stream.luma_size();

        if verbose {
            eprint!("Processing:\n  >");
        }

        let mut frames = 0u64;
        while stream.read_frame(&mut cur)? {
            if frames > 0 {
                detector.push_pair(&prev[..luma_size], &cur[..luma_size])?;
            }
            std::mem::swap(&mut prev, &mut cur);
            frames += 1;

            if verbose && frames % 10 == 0 {
                eprint!(".");
            }
        }

        if verbose {
            eprintln!("<");
            eprintln!("=> {frames} frames processed");
        }

        let report = detector.finish();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if verbose {
            eprint!("\nSSDs for even fields: ");
            for k in 0..PATTERN_LENGTH {
                eprint!("{:.3}, ", report.ssd_even[k]);
            }
            eprint!("\nSSDs for odd fields:  ");
            for k in 0..PATTERN_LENGTH {
                eprint!("{:.3}, ", report.ssd_odd[k]);
            }
            eprintln!("\n");
        }

        match report.verdict {
            TelecineVerdict::Present => {
                // Naming the exact pulldown variant from the two phases is
                // deliberately left to downstream tooling.
                println!("{}", style("Telecine detected").green().bold());
                if let (Some(even), Some(odd)) = (report.phase_even, report.phase_odd) {
                    println!("minimal-energy phases: even {even}, odd {odd}");
                }
            }
            TelecineVerdict::Absent => {
                println!("{}", style("Telecine IS NOT detected").red());
            }
            TelecineVerdict::Indeterminate => {
                let reason = if report.frames < (PATTERN_LENGTH + 1) as u64 {
                    format!("{} frames, need at least {}", report.frames, PATTERN_LENGTH + 1)
                } else {
                    "no field-difference energy in stream".to_owned()
                };
                println!("{} ({reason})", style("Telecine indeterminate").yellow());
            }
        }

        Ok(())
    }
}
