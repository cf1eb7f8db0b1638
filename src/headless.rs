use std::io::{self, Write};
use std::ops::ControlFlow;

use anyhow::{Context, Result};
use word_drift::{CloudSession, RenderSnapshot, TickerControl, run_fixed_rate};

#[derive(Clone, Copy, Debug)]
pub struct HeadlessRun {
    pub ticks: u64,
    pub emit_every: u64,
}

/// Runs the ticker on the calling thread and writes every `emit_every`-th
/// snapshot to stdout as one JSON line. Skipped ticks still use up a tick.
pub fn run(session: &CloudSession, run: HeadlessRun) -> Result<()> {
    if run.ticks == 0 {
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let control = TickerControl::default();
    let emit_every = run.emit_every.max(1);

    let mut ticks = 0_u64;
    let mut emitted = 0_u64;
    let mut failure = None;

    run_fixed_rate(session, &control, |snapshot| {
        ticks += 1;
        if let Some(snapshot) = snapshot
            && ticks % emit_every == 0
        {
            if let Err(error) = write_snapshot(&mut out, &snapshot) {
                failure = Some(error);
                return ControlFlow::Break(());
            }
            emitted += 1;
        }

        if ticks >= run.ticks {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    if let Some(error) = failure {
        return Err(error);
    }

    tracing::info!(ticks, emitted, "headless run finished");
    out.flush().context("failed to flush stdout")
}

fn write_snapshot(out: &mut impl Write, snapshot: &RenderSnapshot) -> Result<()> {
    serde_json::to_writer(&mut *out, snapshot).context("failed to encode snapshot")?;
    writeln!(out).context("failed to write snapshot")
}

#[cfg(test)]
mod tests {
    use word_drift::CloudConfig;

    use super::*;

    #[test]
    fn snapshot_is_written_as_one_json_line() {
        let session = CloudSession::new(CloudConfig {
            deterministic: true,
            ..CloudConfig::default()
        });
        session.ingest("ferris the crab");
        let snapshot = session.tick().unwrap();

        let mut buffer = Vec::new();
        write_snapshot(&mut buffer, &snapshot).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["frame"], 1);
        assert_eq!(value["words"].as_array().map(Vec::len), Some(2));
    }
}
