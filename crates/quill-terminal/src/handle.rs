//! A single PTY handle: the master side of a pseudo-terminal pair plus the
//! spawned child process, with a reader thread feeding an mpsc channel so
//! output can always be drained without blocking.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use quill_common::TerminalError;

/// Maximum bytes to read from a PTY in a single chunk (8 KB).
pub(crate) const PTY_READ_CHUNK: usize = 8_192;

/// Registry-internal record binding one live OS process to its streams.
pub struct PtyHandle {
    /// Writer to send input bytes to the PTY.
    writer: Box<dyn Write + Send>,
    /// Receiver for output chunks from the reader thread.
    output_rx: mpsc::Receiver<Vec<u8>>,
    /// Child process handle (for wait / kill).
    child: Box<dyn Child + Send + Sync>,
    /// Master PTY handle (for resize).
    master: Box<dyn MasterPty + Send>,
    /// Resolved absolute path the shell started in.
    cwd: PathBuf,
    /// Set once `drain_output` observes the reader channel disconnect.
    saw_eof: bool,
    /// Trailing bytes of an incomplete UTF-8 sequence, held back by
    /// `drain_output` until the rest of the character arrives.
    carry: Vec<u8>,
}

/// Length of an incomplete UTF-8 sequence at the end of `buf`; 0 when the
/// buffer ends on a character boundary or on bytes no further input could
/// complete.
fn incomplete_suffix_len(buf: &[u8]) -> usize {
    for back in 1..=buf.len().min(3) {
        let byte = buf[buf.len() - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue; // continuation byte, look further back for the lead
        }
        let need = match byte {
            b if b & 0b1110_0000 == 0b1100_0000 => 2,
            b if b & 0b1111_0000 == 0b1110_0000 => 3,
            b if b & 0b1111_1000 == 0b1111_0000 => 4,
            _ => return 0, // ASCII or an invalid lead
        };
        return if back < need { back } else { 0 };
    }
    0
}

impl PtyHandle {
    /// Spawn `shell` inside a new PTY of the given size, starting in `cwd`.
    ///
    /// The host environment is inherited and `TERM` is set to
    /// `xterm-256color`. A reader thread is registered before this returns,
    /// so no early output is lost.
    pub fn spawn(shell: &str, cwd: PathBuf, cols: u16, rows: u16) -> Result<Self, TerminalError> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| TerminalError::SpawnFailed(e.to_string()))?;

        let mut cmd = CommandBuilder::new(shell);
        cmd.env("TERM", "xterm-256color");
        cmd.cwd(&cwd);

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| TerminalError::SpawnFailed(e.to_string()))?;

        // Only the master side is needed from here on.
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| TerminalError::SpawnFailed(e.to_string()))?;

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| TerminalError::SpawnFailed(e.to_string()))?;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        thread::Builder::new()
            .name("pty-reader".to_string())
            .spawn(move || {
                let mut buf = [0u8; PTY_READ_CHUNK];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => break, // EOF, child exited
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break; // receiver dropped
                            }
                        }
                        Err(e) => {
                            tracing::debug!("PTY reader error: {e}");
                            break;
                        }
                    }
                }
            })
            .map_err(|e| TerminalError::SpawnFailed(e.to_string()))?;

        Ok(Self {
            writer,
            output_rx: rx,
            child,
            master: pair.master,
            cwd,
            saw_eof: false,
            carry: Vec::new(),
        })
    }

    /// The resolved working directory the shell started in.
    pub fn cwd(&self) -> &PathBuf {
        &self.cwd
    }

    /// Write raw input bytes (keystrokes) into the PTY verbatim.
    pub fn write_input(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()
    }

    /// Update the kernel's notion of the terminal dimensions.
    ///
    /// No clamping: zero dimensions are passed through to the OS layer.
    pub fn resize(&self, cols: u16, rows: u16) {
        if let Err(e) = self.master.resize(PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }) {
            tracing::debug!("PTY resize failed: {e}");
        }
    }

    /// Drain all currently buffered output chunks, in production order.
    /// Non-blocking: returns an empty vec when nothing is pending.
    ///
    /// A multibyte character split across read chunks is never handed out
    /// in halves: the trailing incomplete sequence is held back and
    /// prepended to the next drain. On EOF everything is flushed as is.
    ///
    /// Observing the channel disconnect here (rather than in a separate
    /// probing call) guarantees no final output chunk is ever discarded on
    /// the way to detecting the exit.
    pub fn drain_output(&mut self) -> Vec<u8> {
        let mut buf = std::mem::take(&mut self.carry);
        loop {
            match self.output_rx.try_recv() {
                Ok(chunk) => buf.extend_from_slice(&chunk),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.saw_eof = true;
                    break;
                }
            }
        }
        if !self.saw_eof {
            let keep = incomplete_suffix_len(&buf);
            if keep > 0 {
                self.carry = buf.split_off(buf.len() - keep);
            }
        }
        buf
    }

    /// Whether the reader thread has exited (EOF on the master side, i.e.
    /// the child is gone and all of its output has been drained). Only
    /// meaningful after a `drain_output` call.
    pub fn is_finished(&self) -> bool {
        self.saw_eof
    }

    /// Send the termination signal to the child process.
    pub fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            tracing::debug!("PTY kill error (may already be dead): {e}");
        }
    }

    /// Wait for the child to exit and return its exit code.
    pub fn wait_exit_code(&mut self) -> Option<u32> {
        match self.child.wait() {
            Ok(status) => Some(status.exit_code()),
            Err(e) => {
                tracing::debug!("PTY wait error: {e}");
                None
            }
        }
    }
}

impl Drop for PtyHandle {
    fn drop(&mut self) {
        // Kill the child so the master fd closes and the reader thread exits
        // naturally. The process may already be gone.
        let _ = self.child.kill();
    }
}
