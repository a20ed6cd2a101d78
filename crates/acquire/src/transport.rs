use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Line output and single-byte command input.
pub trait Transport {
    /// Write one record followed by a line break.
    fn emit_line(&mut self, line: &str) -> io::Result<()>;

    /// Take one pending command byte without blocking.
    fn try_receive(&mut self) -> io::Result<Option<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn emit_line(&mut self, line: &str) -> io::Result<()> {
        (**self).emit_line(line)
    }

    fn try_receive(&mut self) -> io::Result<Option<u8>> {
        (**self).try_receive()
    }
}

/// Records on stdout, commands from stdin.
///
/// Stdin only offers blocking reads, so a reader thread forwards bytes
/// over a channel that the loop drains with `try_recv`.
pub struct StdioTransport {
    commands: Receiver<u8>,
}

impl StdioTransport {
    pub fn new() -> Self {
        let (sender, commands) = mpsc::channel();

        std::thread::spawn(move || {
            for byte in io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                if sender.send(byte).is_err() {
                    break;
                }
            }
        });

        Self { commands }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for StdioTransport {
    fn emit_line(&mut self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\r\n")?;
        out.flush()
    }

    fn try_receive(&mut self) -> io::Result<Option<u8>> {
        match self.commands.try_recv() {
            Ok(byte) => Ok(Some(byte)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }
}
