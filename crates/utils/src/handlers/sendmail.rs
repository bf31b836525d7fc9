use std::{path::PathBuf, process::Stdio};

use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, error, info};

use crate::{
    handler::{HandlerError, HandlerFuture, MessageHandler},
    EmailMessage,
};

/// Message handler that re-injects a copy through a sendmail-compatible
/// command.
///
/// The command is invoked once per copy as
/// `<command> <args..> -f <envelope_sender> <destination>` with the
/// serialized message piped to its stdin, and is run to completion with
/// its output fully drained before the handler returns. The exit status
/// (plus any stderr text) is the sole delivery signal.
pub struct SendmailHandler {
    command: PathBuf,
    args: Vec<String>,
}

impl SendmailHandler {
    /// Creates a new [`SendmailHandler`] invoking `command` with the given
    /// fixed arguments before the envelope addressing.
    pub fn new(command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        let command = command.into();
        info!(command = %command.display(), "Sendmail handler initialized");
        Self { command, args }
    }
}

impl MessageHandler for SendmailHandler {
    fn handle<'a>(&'a self, message: &'a EmailMessage) -> HandlerFuture<'a> {
        Box::pin(async move {
            debug!(
                command = %self.command.display(),
                from = %message.from,
                to = %message.to,
                "Spawning transport process"
            );

            let mut child = Command::new(&self.command)
                .args(&self.args)
                .arg("-f")
                .arg(&message.from)
                .arg(&message.to)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| {
                    error!(
                        command = %self.command.display(),
                        error = %e,
                        "Failed to spawn transport"
                    );
                    HandlerError::Spawn(format!("{}: {e}", self.command.display()))
                })?;

            // The transport may exit before draining its input; the exit
            // status stays authoritative in that case, so the write result
            // is only consulted after a successful run.
            let write_result = match child.stdin.take() {
                Some(mut stdin) => stdin.write_all(message.raw()).await,
                None => Ok(()),
            };

            let output = child
                .wait_with_output()
                .await
                .map_err(|e| HandlerError::Io(e.to_string()))?;

            if !output.status.success() {
                let code = output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                let detail = if stderr.is_empty() {
                    format!("{} exited with status {code}", self.command.display())
                } else {
                    format!("{} exited with status {code}: {stderr}", self.command.display())
                };
                error!(to = %message.to, status = %code, "Transport rejected message");
                return Err(HandlerError::Transport(detail));
            }

            write_result
                .map_err(|e| HandlerError::Io(format!("failed to feed transport stdin: {e}")))?;

            info!(from = %message.from, to = %message.to, "Copy handed to transport");
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "sendmail"
    }
}
