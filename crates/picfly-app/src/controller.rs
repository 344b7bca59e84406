use std::sync::Arc;

use kanal::{Receiver, Sender};
use picfly_input::KeyStateReset;
use picfly_types::Command;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    /// Hook thread → dispatcher. Sync on the sending side so the hook never awaits.
    pub commands: (Sender<Command>, Receiver<Command>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            commands: kanal::bounded(capacity.max(1)),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(state.config.command_queue_capacity),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Sender handed to the hotkey listener
    pub fn command_sender(&self) -> Sender<Command> {
        self.channels.commands.0.clone()
    }

    pub fn spawn_tasks(&self, key_reset: Option<KeyStateReset>) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.commands.1.clone().to_async(),
            self.cancel_token.child_token(),
            key_reset,
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
