use crate::transport::{Transport, TransportError};
use tracing::debug;

/// Session-terminating verb. Any other recognized verb keeps the session
/// open; unrecognized bytes are silently ignored.
pub const VERB_EXIT: u8 = b'E';
/// Diagnostic no-op verb, answered with an echo line.
pub const VERB_TEST: u8 = b'T';

const LINE_END: u8 = b'\n';

/// What a fed byte did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellState {
    /// Consuming the line that opened the session; it is an entry banner,
    /// not a command.
    Banner,
    AwaitVerb,
    DrainLine { then_exit: bool },
}

/// Operator command session over the radio/serial link.
///
/// Input is line-delimited: the first byte of each line is the verb, the
/// remainder of the line is discarded. Driven one byte at a time so the node
/// loop can stay non-blocking while a session is open; the node suspends all
/// telemetry activity until [`SessionEvent::Exit`] comes back.
#[derive(Debug)]
pub struct CommandShell {
    state: ShellState,
}

impl CommandShell {
    pub fn new() -> Self {
        Self {
            state: ShellState::Banner,
        }
    }

    /// Feed one input byte; echo lines go back out through `link`.
    pub fn feed<T: Transport>(
        &mut self,
        byte: u8,
        link: &mut T,
    ) -> Result<SessionEvent, TransportError> {
        match self.state {
            ShellState::Banner => {
                if byte == LINE_END {
                    self.state = ShellState::AwaitVerb;
                }
                Ok(SessionEvent::Continue)
            }
            ShellState::AwaitVerb => {
                if byte == LINE_END {
                    // Empty line, keep waiting for a verb.
                    return Ok(SessionEvent::Continue);
                }
                link.write(b"got cmd: ")?;
                link.write(&[byte, LINE_END])?;
                debug!(verb = %(byte as char), "command verb");

                let then_exit = match byte {
                    VERB_EXIT => true,
                    VERB_TEST => {
                        link.write(b"cmd mode ok\n")?;
                        false
                    }
                    _ => false,
                };
                self.state = ShellState::DrainLine { then_exit };
                Ok(SessionEvent::Continue)
            }
            ShellState::DrainLine { then_exit } => {
                if byte != LINE_END {
                    return Ok(SessionEvent::Continue);
                }
                if then_exit {
                    debug!("command session closed");
                    // Next session starts with its own banner line.
                    self.state = ShellState::Banner;
                    Ok(SessionEvent::Exit)
                } else {
                    self.state = ShellState::AwaitVerb;
                    Ok(SessionEvent::Continue)
                }
            }
        }
    }
}

impl Default for CommandShell {
    fn default() -> Self {
        Self::new()
    }
}
