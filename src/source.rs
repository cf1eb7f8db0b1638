use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use word_drift::IngestionQueue;

/// Where stream lines come from.
#[derive(Clone, Debug)]
pub enum MessageSource {
    Stdin,
    File { path: PathBuf, repeat: bool },
}

impl MessageSource {
    pub fn from_args(input: Option<PathBuf>, repeat: bool) -> Result<Self> {
        match input {
            Some(path) => {
                if !path.is_file() {
                    bail!("input {} is not a readable file", path.display());
                }
                Ok(Self::File { path, repeat })
            }
            None if repeat => bail!("--loop-input needs --input <PATH>; stdin cannot be replayed"),
            None => Ok(Self::Stdin),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_owned(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }
}

/// Feeds `queue` from `source` on a background thread, one message per
/// non-blank line.
pub fn spawn_reader(
    source: MessageSource,
    queue: IngestionQueue,
    line_delay: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let name = source.describe();
        tracing::info!(source = %name, "message stream started");

        let result = match &source {
            MessageSource::Stdin => pump(io::stdin().lock(), &queue, line_delay).map(|_| ()),
            MessageSource::File { path, repeat } => pump_file(path, *repeat, &queue, line_delay),
        };

        match result {
            Ok(()) => tracing::info!(source = %name, "message stream ended"),
            Err(error) => tracing::warn!(source = %name, "message stream failed: {error:#}"),
        }
    })
}

fn pump_file(path: &Path, repeat: bool, queue: &IngestionQueue, line_delay: Duration) -> Result<()> {
    loop {
        let file = File::open(path)
            .with_context(|| format!("failed to open input {}", path.display()))?;
        let sent = pump(BufReader::new(file), queue, line_delay)?;
        if !repeat {
            return Ok(());
        }
        if sent == 0 {
            bail!("input {} has no messages to replay", path.display());
        }
        tracing::debug!(sent, "replaying input");
    }
}

/// Pushes every non-blank line of `reader`. Returns how many were sent.
fn pump(reader: impl BufRead, queue: &IngestionQueue, line_delay: Duration) -> Result<usize> {
    let mut sent = 0;
    for line in reader.lines() {
        let line = line.context("failed to read message line")?;
        let message = line.trim_end_matches('\r');
        if message.trim().is_empty() {
            continue;
        }

        queue.push(message);
        sent += 1;
        if !line_delay.is_zero() {
            thread::sleep(line_delay);
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        let queue = IngestionQueue::new(16);
        let input = Cursor::new("first line\r\n\n   \nsecond line\n");
        let sent = pump(input, &queue, Duration::ZERO).unwrap();
        assert_eq!(sent, 2);
        assert_eq!(queue.drain(10), ["first line", "second line"]);
    }

    #[test]
    fn looping_stdin_is_rejected() {
        assert!(MessageSource::from_args(None, true).is_err());
        assert!(matches!(
            MessageSource::from_args(None, false),
            Ok(MessageSource::Stdin)
        ));
    }
}
