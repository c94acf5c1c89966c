//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};
use shared::error::TransportError;

use crate::backend_bridge::commands::BackendCommand;

pub const QUEUE_FULL: &str = "UI command queue is full; please retry";
pub const WORKER_DISCONNECTED: &str =
    "Backend command processor disconnected (possible startup/runtime failure); restart the app";

/// Queues `cmd` for the backend worker. When it cannot be queued the command
/// is handed back with the error its ticket should be finished with.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), (BackendCommand, TransportError)> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(cmd)) => {
            tracing::warn!(command = cmd_name, "backend command queue full");
            Err((cmd, TransportError::Request(QUEUE_FULL.to_string())))
        }
        Err(TrySendError::Disconnected(cmd)) => {
            tracing::error!(command = cmd_name, "backend command processor disconnected");
            Err((cmd, TransportError::Request(WORKER_DISCONNECTED.to_string())))
        }
    }
}
