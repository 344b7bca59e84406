use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use kanal::Sender;
use picfly_types::{Command, KeyEvent};

use crate::InputError;
use crate::recognizer::HotkeyRecognizer;

/// What the source should do with the event it just delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Pass,
    Suppress,
}

pub type EventSink = Box<dyn FnMut(KeyEvent) -> Disposition + Send>;

/// Stops a running [`InputEventSource::pump`] from another thread.
pub trait Stopper: Send + Sync + 'static {
    fn stop(&self);
}

/// OS keyboard event source.
///
/// Both methods are called on the same dedicated thread: `install` hooks into the OS and
/// must return promptly, `pump` then blocks delivering events to the sink until stopped.
pub trait InputEventSource: Send + 'static {
    type Stopper: Stopper;

    fn install(&mut self, sink: EventSink) -> Result<Self::Stopper, InputError>;

    fn pump(&mut self) -> Result<(), InputError>;
}

/// Lets other components ask the recognizer to forget its key state, e.g. after a modal
/// overlay may have swallowed key-ups.
#[derive(Debug, Clone)]
pub struct KeyStateReset(Arc<AtomicBool>);

impl KeyStateReset {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for KeyStateReset {
    fn default() -> Self {
        Self::new()
    }
}

/// Running hotkey listener thread.
pub struct HotkeyListener {
    stopper: Box<dyn Stopper>,
    reset: KeyStateReset,
    thread: Option<JoinHandle<()>>,
}

impl HotkeyListener {
    /// Start `source` on its own thread with a recognizer feeding `commands`.
    ///
    /// Returns once the source is installed, or with the install error.
    pub fn spawn<S: InputEventSource>(
        mut source: S,
        recognizer: HotkeyRecognizer,
        commands: Sender<Command>,
        suppress_triggers: bool,
    ) -> Result<Self, InputError> {
        let reset = KeyStateReset::new();
        let sink = recognizer_sink(recognizer, commands, reset.clone(), suppress_triggers);
        let (ready_tx, ready_rx) = kanal::bounded::<Result<S::Stopper, InputError>>(1);

        let thread = thread::Builder::new()
            .name("picfly-hotkeys".into())
            .spawn(move || {
                match source.install(sink) {
                    Ok(stopper) => {
                        if ready_tx.send(Ok(stopper)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                }

                tracing::info!("hotkey listener running");
                if let Err(e) = source.pump() {
                    tracing::error!("hotkey listener stopped with error: {e}");
                } else {
                    tracing::info!("hotkey listener stopped");
                }
            })?;

        let stopper = ready_rx
            .recv()
            .map_err(|_| InputError::Unavailable("listener thread exited during startup".into()))??;

        Ok(Self {
            stopper: Box::new(stopper),
            reset,
            thread: Some(thread),
        })
    }

    /// Handle for asking the recognizer to forget its key state before the next event.
    pub fn reset_handle(&self) -> KeyStateReset {
        self.reset.clone()
    }

    /// Stop the source and wait for its thread to finish.
    pub fn shutdown(mut self) {
        self.stopper.stop();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("hotkey listener thread panicked");
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stopper.stop();
        }
    }
}

fn recognizer_sink(
    mut recognizer: HotkeyRecognizer,
    commands: Sender<Command>,
    reset: KeyStateReset,
    suppress_triggers: bool,
) -> EventSink {
    Box::new(move |event| {
        if reset.take() {
            recognizer.reset();
        }

        let Some(command) = recognizer.feed(event) else {
            return Disposition::Pass;
        };

        tracing::info!(%command, key = %event.key, "hotkey recognized");
        // Never block the OS callback
        match commands.try_send(command) {
            Ok(true) => {}
            Ok(false) => tracing::warn!(%command, "command queue full, dropping"),
            Err(e) => tracing::warn!(%command, "command queue closed: {e}"),
        }

        if suppress_triggers {
            Disposition::Suppress
        } else {
            Disposition::Pass
        }
    })
}
