use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kanal::AsyncReceiver;
use picfly_input::KeyStateReset;
use picfly_io::Notification;
use picfly_types::{AppError, Command};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod capture;
pub mod clipboard;

use capture::{handle_capture_ocr, handle_capture_upload};
use clipboard::{handle_clipboard_ocr, handle_clipboard_upload};

/// Per-action context handed to each spawned handler
#[derive(Clone)]
pub struct ActionContext {
    pub state: Arc<AppState>,
    pub cancel: CancellationToken,
    selecting: Arc<AtomicBool>,
    key_reset: Option<KeyStateReset>,
}

impl ActionContext {
    /// Called once the selector has torn its overlay down.
    pub fn selection_finished(&self) {
        self.selecting.store(false, Ordering::Release);
        if let Some(reset) = &self.key_reset {
            reset.request();
        }
    }

    pub fn error(&self, error: impl Into<AppError>) -> Notification {
        let error = error.into();
        tracing::warn!("{error}");
        Notification::error(self.state.title(), error.to_string())
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        Notification::info(self.state.title(), message)
    }
}

/// Receives commands in key-down order and runs each as its own task.
///
/// Returns after `Quit`, cancellation, or the queue closing, once every running handler has
/// finished.
pub async fn event_loop(
    state: Arc<AppState>,
    commands: AsyncReceiver<Command>,
    cancel: CancellationToken,
    key_reset: Option<KeyStateReset>,
) -> anyhow::Result<()> {
    let selecting = Arc::new(AtomicBool::new(false));
    let mut tasks = JoinSet::new();

    tracing::info!("waiting for commands");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("event loop cancelled");
                break;
            }
            received = commands.recv() => {
                let command = match received {
                    Ok(command) => command,
                    Err(e) => {
                        tracing::warn!("command queue closed: {e}");
                        break;
                    }
                };
                if command == Command::Quit {
                    tracing::info!("quit requested");
                    break;
                }
                if selecting.load(Ordering::Acquire) {
                    tracing::info!(%command, "selection in progress, dropping command");
                    continue;
                }
                if command.needs_selection() {
                    selecting.store(true, Ordering::Release);
                }

                let ctx = ActionContext {
                    state: state.clone(),
                    cancel: cancel.child_token(),
                    selecting: selecting.clone(),
                    key_reset: key_reset.clone(),
                };
                tracing::debug!(%command, "dispatching");
                tasks.spawn(handle_command(ctx, command));
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("command handler failed: {e}");
                }
            }
        }
    }

    // Stops a live selection and any request in flight
    cancel.cancel();
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("command handler failed during shutdown: {e}");
        }
    }
    tracing::info!("event loop stopped");
    Ok(())
}

async fn handle_command(ctx: ActionContext, command: Command) {
    let notification = match command {
        Command::CaptureUpload => handle_capture_upload(&ctx).await,
        Command::CaptureOcr => handle_capture_ocr(&ctx).await,
        Command::ClipboardUpload => handle_clipboard_upload(&ctx).await,
        Command::ClipboardOcr => handle_clipboard_ocr(&ctx).await,
        Command::Quit => None,
    };

    match notification {
        Some(notification) => ctx.state.notifier.notify(notification),
        None => tracing::debug!(%command, "finished without a notification"),
    }
}

/// Short single-line preview of recognized text
pub fn preview(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
