use std::sync::Arc;

use anyhow::Context;
use picfly_config::Config;
use picfly_input::HotkeyListener;
use tokio::signal;
use tokio::task::JoinSet;

mod cli;
mod controller;
mod events;
mod logging;
mod profile;
mod state;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before the config is built, it reads the environment
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("ignoring .env: {e}");
    }

    let args = cli::parse();
    logging::init(args.verbose, args.log_json)?;
    tracing::info!("picfly v{} starting", env!("CARGO_PKG_VERSION"));

    let config = profile::load(args.config.as_deref())?;
    config.validate().context("Invalid config")?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    log_hotkeys(&config);

    // Before the hook, the capture or any window exists
    #[cfg(windows)]
    picfly_capture::enable_dpi_awareness();

    let state = Arc::new(AppState::new(config)?);
    let controller = AppController::new(state.clone());

    let listener = start_listener(&controller, &state.config)?;
    let tasks = controller.spawn_tasks(listener.as_ref().map(HotkeyListener::reset_handle));

    run(&controller, tasks).await;

    if let Some(listener) = listener {
        listener.shutdown();
    }
    tracing::info!("bye");
    Ok(())
}

fn log_hotkeys(config: &Config) {
    tracing::info!("hotkeys:");
    for combo in config.hotkeys.combinations() {
        tracing::info!("  {combo}");
    }
}

/// Install the global keyboard hook. Failing here is fatal.
#[cfg(windows)]
fn start_listener(
    controller: &AppController,
    config: &Config,
) -> anyhow::Result<Option<HotkeyListener>> {
    use picfly_input::{HotkeyRecognizer, KeyboardHook};
    use picfly_types::AppError;

    let listener = HotkeyListener::spawn(
        KeyboardHook::new(),
        HotkeyRecognizer::new(config.hotkeys.combinations()),
        controller.command_sender(),
        config.hotkeys.suppress_triggers,
    )
    .map_err(AppError::from)?;
    Ok(Some(listener))
}

#[cfg(not(windows))]
fn start_listener(
    _controller: &AppController,
    _config: &Config,
) -> anyhow::Result<Option<HotkeyListener>> {
    Ok(None)
}

/// Wait for Ctrl+C or the dispatcher to stop, then drain every task.
async fn run(controller: &AppController, mut tasks: JoinSet<anyhow::Result<()>>) {
    tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => tracing::info!("Shutdown requested"),
                Err(e) => tracing::error!("failed to listen for ctrl+c: {e}"),
            }
        }
        Some(joined) = tasks.join_next() => report(joined),
    }

    controller.shutdown();
    while let Some(joined) = tasks.join_next().await {
        report(joined);
    }
}

fn report(joined: Result<anyhow::Result<()>, tokio::task::JoinError>) {
    match joined {
        Ok(Ok(())) => tracing::debug!("task finished"),
        Ok(Err(e)) => tracing::error!("task failed: {e:#}"),
        Err(e) => tracing::error!("task panicked: {e}"),
    }
}
