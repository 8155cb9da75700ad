//! cherrypick: interactive terminal picker for cherry-picking commits.
//!
//! Entry point for the `cherrypick` binary. Wires together configuration
//! (`cherrypick-core`), the terminal lifecycle (`tui`), the unified event bus
//! (`event`), the git worker thread (`git`), rendering (`ui`), and the replay
//! driver that runs after the picker exits (`replay`).
//!
//! # Startup sequence
//!
//! 1. Parse arguments; `--generate-config` writes the defaults and exits.
//! 2. Install logging, load config, open the repository, validate setup.
//!    All of this happens before the terminal is touched, so setup errors
//!    print plainly.
//! 3. Optional fetch, then spawn the git worker and queue the first request
//!    (a conflict listing when a replay is already paused, else a commit load).
//! 4. `install_panic_hook()` and `register_sigterm()`, then enter the picker.
//!
//! # Sessions
//!
//! The picker can run more than once per process. When a replay stops on a
//! conflict the terminal is re-entered with the conflict session open, and the
//! session's outcome decides whether the replay resumes. The event channel
//! and the git worker outlive every session; only the input task is respawned.

mod app;
mod cli;
mod event;
mod git;
mod replay;
mod telemetry;
mod theme;
mod tui;
mod ui;

use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cherrypick_core::config::{default_path, Config};
use cherrypick_core::git::GitCli;
use cherrypick_core::loader::{fetch_remote, validate_setup};
use cherrypick_core::types::ReplayOutcome;
use cherrypick_core::vcs::{ConflictInspector, ReplayExecutor};

use crate::app::{AppState, DisplayOptions, ExitReason};
use crate::cli::Cli;
use crate::event::{spawn_event_task, AppEvent, EventHandler};
use crate::git::types::GitResultPayload;
use crate::replay::{finish, resume_replay, start_replay, ReplaySettings};
use crate::theme::Theme;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

/// Shortest blink tick accepted from config.
const MIN_TICK: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => default_path().context("cannot locate a config directory; set HOME or pass --config")?,
    };

    if cli.generate_config {
        Config::generate_default(&config_path)?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    telemetry::init()?;
    let config = Config::load(&config_path)?;
    let theme = Theme::from_name(&config.ui.theme);

    let vcs = GitCli::discover(".")?;
    let setup = validate_setup(&vcs, &config.git.excluded_branches)?;
    info!(branch = %setup.current_branch, author = %setup.user_name, "setup validated");

    let notice = if config.git.auto_fetch { fetch_remote(&vcs, &config.git.remote) } else { None };

    let mut state =
        AppState::new(config.scope(&setup.user_name), setup.current_branch.clone(), DisplayOptions::from(&config.ui));
    state.oldest_first = cli.oldest_first(config.behavior.default_reverse);

    let mut events = EventHandler::new();
    let (git_tx, git_rx) = crossbeam_channel::unbounded();
    let worker_events = events.tx.clone();
    let workdir = vcs.workdir().to_path_buf();
    let worker = std::thread::Builder::new()
        .name("git-worker".to_owned())
        .spawn(move || git::worker::git_worker_loop(workdir, git_rx, worker_events))
        .context("spawning the git worker")?;
    state.set_git_tx(git_tx);

    match vcs.replay_in_progress() {
        Some(id) => {
            info!(%id, "cherry-pick already in progress");
            state.enter_conflict(&id, Vec::new(), false);
        }
        None => state.begin_reload(),
    }
    state.status = notice;

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm().context("registering the SIGTERM handler")?;
    let tick_rate = Duration::from_millis(config.ui.cursor_blink_interval_ms).max(MIN_TICK);

    let outcome = drive_sessions(&mut state, &mut events, &vcs, &config, &theme, tick_rate, &term_flag).await;

    // Dropping the state closes the request channel, which ends the worker.
    drop(state);
    if worker.join().is_err() {
        warn!("git worker panicked");
    }
    outcome
}

/// Runs picker sessions until one ends in something other than a replay conflict.
async fn drive_sessions(
    state: &mut AppState,
    events: &mut EventHandler,
    vcs: &GitCli,
    config: &Config,
    theme: &Theme,
    tick_rate: Duration,
    term_flag: &AtomicBool,
) -> Result<()> {
    let mut out = std::io::stdout();
    loop {
        let reason = run_tui(state, events, vcs, theme, tick_rate, term_flag).await?;
        info!(?reason, "picker exited");
        wait_for_worker(state, events).await;
        let settings = ReplaySettings::new(&state.scope, config);

        let outcome = match reason {
            ExitReason::Quit => {
                report_paused_replay(vcs, state, &mut out)?;
                return Ok(());
            }
            ExitReason::Rebase(id) => {
                vcs.start_interactive_rebase(&id).context("interactive rebase")?;
                return Ok(());
            }
            ExitReason::ReplayAborted => {
                writeln!(out, "Cherry-pick aborted.")?;
                return Ok(());
            }
            ExitReason::ReplayCompleted => ReplayOutcome::Applied,
            ExitReason::Replay(ids) => start_replay(vcs, &settings, &ids, &mut out)?,
            ExitReason::ResumeReplay(ids) => resume_replay(vcs, &ids, &mut out)?,
        };

        match outcome {
            ReplayOutcome::Applied => return finish(vcs, &settings, &mut out),
            ReplayOutcome::ConflictAt { id, remaining } => state.enter_conflict(&id, remaining, true),
        }
    }
}

/// Blocks until the git worker has served everything queued so far.
///
/// Results that arrive meanwhile belong to the closed screen and are
/// dropped, so `pending_replay` keeps the queue as it was at exit.
async fn wait_for_worker(state: &AppState, events: &mut EventHandler) {
    if !state.request_barrier() {
        return;
    }
    while let Some(event) = events.rx.recv().await {
        if let AppEvent::GitResult(payload) = event {
            if matches!(*payload, GitResultPayload::Idle) {
                return;
            }
            debug!("dropping a git result that arrived after exit");
        }
    }
}

/// Reminds the operator of a paused cherry-pick and of queued commits that
/// never got applied.
fn report_paused_replay<V, W>(vcs: &V, state: &AppState, out: &mut W) -> Result<()>
where
    V: ConflictInspector + ?Sized,
    W: Write,
{
    if let Some(id) = vcs.replay_in_progress() {
        let short: String = id.chars().take(8).collect();
        writeln!(out, "A cherry-pick of {short} is still in progress.")?;
        writeln!(out, "Resolve it with git, or run cherrypick again to pick up where you left off.")?;
    }
    if !state.pending_replay.is_empty() {
        writeln!(out, "Not yet applied (oldest first):")?;
        for id in &state.pending_replay {
            writeln!(out, "  {id}")?;
        }
    }
    Ok(())
}

/// One picker session: enter the terminal, run the loop, always restore.
async fn run_tui(
    state: &mut AppState,
    events: &mut EventHandler,
    vcs: &GitCli,
    theme: &Theme,
    tick_rate: Duration,
    term_flag: &AtomicBool,
) -> Result<ExitReason> {
    let mut terminal = tui::init_tui().context("initialising the terminal")?;
    let mut input = spawn_event_task(events.tx.clone(), tick_rate);

    let outcome = event_loop(&mut terminal, &mut input, state, events, vcs, theme, tick_rate, term_flag).await;

    input.abort();
    tui::restore_tui().context("restoring the terminal")?;
    outcome
}

/// The main loop. Exits only by returning; the caller restores the terminal.
#[allow(clippy::too_many_arguments)]
async fn event_loop(
    terminal: &mut tui::Tui,
    input: &mut JoinHandle<()>,
    state: &mut AppState,
    events: &mut EventHandler,
    vcs: &GitCli,
    theme: &Theme,
    tick_rate: Duration,
    term_flag: &AtomicBool,
) -> Result<ExitReason> {
    // Input queued by a previous session belongs to a screen that is gone.
    while let Ok(event) = events.rx.try_recv() {
        if let AppEvent::GitResult(payload) = event {
            if let Some(reason) = state.apply_git_result(*payload) {
                return Ok(reason);
            }
        }
    }

    loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50 ms even when
            // no other event arrives.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    return Ok(ExitReason::Quit);
                }
            }
            maybe_event = events.rx.recv() => {
                let Some(event) = maybe_event else {
                    return Ok(ExitReason::Quit);
                };
                match event {
                    AppEvent::Render => {
                        terminal.draw(|frame| ui::render(frame, state, theme))?;
                    }
                    AppEvent::Tick => state.on_tick(),
                    AppEvent::Key(key) => match handle_key(key, state) {
                        KeyAction::Continue => {}
                        KeyAction::Exit(reason) => return Ok(reason),
                        KeyAction::Suspend(launch) => {
                            input.abort();
                            tui::restore_tui()?;
                            info!(editor = %launch.option.command, files = launch.paths.len(), "launching editor");
                            let result = vcs.launch_editor(&launch.option, &launch.paths).map_err(|e| e.to_string());
                            *terminal = tui::init_tui()?;
                            *input = spawn_event_task(events.tx.clone(), tick_rate);
                            state.after_editor(result);
                        }
                    },
                    AppEvent::Mouse(mouse) => handle_mouse(mouse, state),
                    // ratatui picks up the new size on the next draw.
                    AppEvent::Resize => {}
                    AppEvent::GitResult(payload) => {
                        if let Some(reason) = state.apply_git_result(*payload) {
                            return Ok(reason);
                        }
                    }
                    AppEvent::Quit => return Ok(ExitReason::Quit),
                }
                if term_flag.load(Ordering::Relaxed) {
                    return Ok(ExitReason::Quit);
                }
            }
        }
    }
}
