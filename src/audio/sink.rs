//! Writes audio commands out as JSON lines for an external synthesizer

use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::info;

/// Drain `rx`, writing each command as one JSON line. Returns the number
/// of commands written once the channel closes.
pub async fn write_commands<W>(
    mut rx: mpsc::UnboundedReceiver<super::AudioCommand>,
    mut out: W,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(command) = rx.recv().await {
        let mut line = serde_json::to_vec(&command)?;
        line.push(b'\n');
        out.write_all(&line).await?;
        out.flush().await?;
        written += 1;
    }
    info!(written, "audio command stream closed");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCommand, OscillatorId};

    #[test]
    fn test_writes_json_lines() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(AudioCommand::Start { osc: OscillatorId::SlidingY }).unwrap();
        tx.send(AudioCommand::Stop { osc: OscillatorId::SlidingY }).unwrap();
        drop(tx);

        let mut out = Vec::new();
        let written = tokio_test::block_on(write_commands(rx, &mut out)).unwrap();

        assert_eq!(written, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], r#"{"type":"start","osc":"sliding_y"}"#);
        assert_eq!(lines[1], r#"{"type":"stop","osc":"sliding_y"}"#);
    }
}
