//! Interactive go/no-go prompt before broadcasting

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

const PROMPT: &str = "Do you want to proceed? (y/n): ";
const RETRY_HINT: &str = "Invalid input. Please type 'y' or 'n'.";

#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("confirmation prompt I/O failed: {0}")]
    Io(#[source] io::Error),

    #[error("input closed before a decision was made")]
    Closed,
}

/// Anything that can approve or decline a broadcast
pub trait Confirm: Send {
    fn confirm(&mut self, bypass: bool) -> Result<bool, ConfirmationError>;
}

/// Map one line of input to a decision, if it is a recognized token
pub fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Run a blocking prompt from async code. Uses `block_in_place` on a
/// multi-thread runtime; elsewhere `f` runs inline on the calling thread.
pub fn block_on_prompt<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(f),
        _ => f(),
    }
}

/// Line-oriented confirmation prompt
pub struct ConfirmationGate<R, W> {
    input: R,
    output: W,
}

impl ConfirmationGate<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmationGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Block until a recognized answer is read. Unrecognized lines re-prompt
    /// without limit; a read failure or end of input is an error.
    pub fn ask(&mut self) -> Result<bool, ConfirmationError> {
        let mut line = String::new();

        loop {
            write!(self.output, "{}", PROMPT).map_err(ConfirmationError::Io)?;
            self.output.flush().map_err(ConfirmationError::Io)?;

            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(ConfirmationError::Io)?;
            if read == 0 {
                return Err(ConfirmationError::Closed);
            }

            match parse_answer(&line) {
                Some(answer) => {
                    debug!(answer, "confirmation received");
                    return Ok(answer);
                }
                None => {
                    writeln!(self.output, "{}", RETRY_HINT).map_err(ConfirmationError::Io)?;
                }
            }
        }
    }
}

impl<R, W> Confirm for ConfirmationGate<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&mut self, bypass: bool) -> Result<bool, ConfirmationError> {
        if bypass {
            return Ok(true);
        }
        self.ask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn gate(input: &str) -> ConfirmationGate<Cursor<Vec<u8>>, Vec<u8>> {
        ConfirmationGate::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_answer_case_insensitive() {
        assert_eq!(parse_answer("Y"), Some(true));
        assert_eq!(parse_answer("yes\n"), Some(true));
        assert_eq!(parse_answer("  YeS \r\n"), Some(true));
        assert_eq!(parse_answer("NO"), Some(false));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer("yep"), None);
        assert_eq!(parse_answer(""), None);
    }

    #[test]
    fn test_reprompts_until_recognized() {
        let mut gate = gate("maybe\n\nsure\nNO\n");
        assert!(!gate.confirm(false).unwrap());

        let output = String::from_utf8(gate.output).unwrap();
        assert_eq!(output.matches(PROMPT).count(), 4);
        assert_eq!(output.matches(RETRY_HINT).count(), 3);
    }

    #[test]
    fn test_many_invalid_lines_do_not_fail() {
        let input = format!("{}yes\n", "x\n".repeat(10_000));
        let mut gate = gate(&input);
        assert!(gate.confirm(false).unwrap());
    }

    #[test]
    fn test_bypass_skips_io() {
        let mut gate = gate("");
        assert!(gate.confirm(true).unwrap());
        assert!(gate.output.is_empty());
    }

    #[test]
    fn test_closed_input_is_error() {
        let mut gate = gate("what\n");
        assert!(matches!(gate.confirm(false), Err(ConfirmationError::Closed)));
    }

    #[test]
    fn test_answer_without_newline() {
        let mut gate = gate("y");
        assert!(gate.confirm(false).unwrap());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_prompt_write_failure_is_io_error() {
        let mut gate = ConfirmationGate::new(Cursor::new(b"y\n".to_vec()), BrokenPipe);
        match gate.confirm(false) {
            Err(ConfirmationError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_block_on_prompt_outside_runtime() {
        assert!(block_on_prompt(|| gate("yes\n").confirm(false)).unwrap());
    }

    #[tokio::test]
    async fn test_block_on_prompt_current_thread() {
        assert!(block_on_prompt(|| gate("yes\n").confirm(false)).unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_block_on_prompt_multi_thread() {
        let ticker = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        });

        assert!(!block_on_prompt(|| gate("n\n").confirm(false)).unwrap());
        ticker.await.unwrap();
    }
}
