use crate::adb::connection::AdbConnection;
use crate::adb::protocol::AdbCommand;
use crate::core::types::{DeviceId, TextEncoding};
use crate::error::{AdbError, Result};
use log::*;
use tokio_util::sync::CancellationToken;

const SHELL_BUFFER_SIZE: usize = 16 * 1024;

/// Consumer of decoded shell output, one line at a time
pub trait OutputReceiver: Send {
    fn add_output(&mut self, line: &str);

    /// Called once the command's output has ended
    fn flush(&mut self) {}
}

/// Splits raw output into lines, dropping `\r` before `\n`.
///
/// Bytes are held until a full line is available, so multi-byte characters
/// split across reads decode correctly.
#[derive(Debug)]
pub struct LineDecoder {
    encoding: TextEncoding,
    pending: Vec<u8>,
}

impl LineDecoder {
    pub fn new(encoding: TextEncoding) -> Self {
        Self {
            encoding,
            pending: Vec::new(),
        }
    }

    /// Feed bytes, returning every line they complete
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(self.encoding.decode(&line));
        }
        lines
    }

    /// The unterminated tail, if any
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        let rest = rest.strip_suffix(b"\r").unwrap_or(&rest[..]);
        Some(self.encoding.decode(rest))
    }
}

/// Keeps every line
#[derive(Debug, Default)]
pub struct CollectingReceiver {
    lines: Vec<String>,
}

impl CollectingReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with `\n`
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }
}

impl OutputReceiver for CollectingReceiver {
    fn add_output(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Forwards each line to a closure
pub struct FnReceiver<F>(pub F);

impl<F> OutputReceiver for FnReceiver<F>
where
    F: FnMut(&str) + Send,
{
    fn add_output(&mut self, line: &str) {
        (self.0)(line)
    }
}

/// Output of a running remote command; ends when the server closes the
/// connection. No exit code is available on this channel.
pub struct ShellStream {
    connection: AdbConnection,
    finished: bool,
}

impl ShellStream {
    /// Switch to `device` and start `command`
    pub async fn open(
        mut connection: AdbConnection,
        device: &DeviceId,
        command: &str,
    ) -> Result<Self> {
        if command.is_empty() {
            return Err(AdbError::InvalidArgument("shell command is empty".into()));
        }

        connection.select_device(device).await?;
        connection
            .execute_host_command(&AdbCommand::Shell.format(&[command]))
            .await?;
        debug!("Shell started on {}: {}", device, command);

        Ok(Self {
            connection,
            finished: false,
        })
    }

    /// Cancelling tears down the connection; the remote process keeps running
    pub fn cancellation_token(&self) -> CancellationToken {
        self.connection.cancellation_token()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next chunk of raw output; 0 once the command has exited
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.finished {
            return Ok(0);
        }
        let n = self.connection.receive(buf).await?;
        if n == 0 {
            self.finished = true;
        }
        Ok(n)
    }

    /// Collect the remaining raw output
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let out = self.connection.read_to_end().await?;
        self.finished = true;
        Ok(out)
    }

    /// Decode output into lines and hand each to `receiver` until the
    /// command exits
    pub async fn pump(&mut self, receiver: &mut dyn OutputReceiver) -> Result<()> {
        let mut decoder = LineDecoder::new(self.connection.encoding());
        let mut buf = vec![0u8; SHELL_BUFFER_SIZE];

        loop {
            let n = self.read_chunk(&mut buf).await?;
            if n == 0 {
                break;
            }
            for line in decoder.push(&buf[..n]) {
                receiver.add_output(&line);
            }
        }

        if let Some(rest) = decoder.finish() {
            receiver.add_output(&rest);
        }
        receiver.flush();
        Ok(())
    }

    pub async fn close(mut self) {
        self.connection.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_decoder_splits_and_strips_cr() {
        let mut decoder = LineDecoder::new(TextEncoding::Utf8);
        assert_eq!(decoder.push(b"one\r\ntw"), vec!["one"]);
        assert_eq!(decoder.push(b"o\nthree"), vec!["two"]);
        assert_eq!(decoder.finish().as_deref(), Some("three"));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_line_decoder_handles_split_utf8() {
        let bytes = "héllo\n".as_bytes();
        let mut decoder = LineDecoder::new(TextEncoding::Utf8);
        assert!(decoder.push(&bytes[..2]).is_empty());
        assert_eq!(decoder.push(&bytes[2..]), vec!["héllo"]);
    }

    #[test]
    fn test_line_decoder_latin1() {
        let mut decoder = LineDecoder::new(TextEncoding::Latin1);
        assert_eq!(decoder.push(&[b'c', 0xE0, b'\n']), vec!["cà"]);
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let mut decoder = LineDecoder::new(TextEncoding::Utf8);
        assert_eq!(decoder.push(b"a\n\nb\n"), vec!["a", "", "b"]);
    }
}
