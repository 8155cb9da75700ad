//! Event bus for cherrypick.
//!
//! Terminal input, timer ticks, and git worker results are normalised into a
//! single `AppEvent` enum and sent over a tokio unbounded MPSC channel. The
//! main loop receives from this channel and dispatches accordingly.
//!
//! Two independent intervals drive the loop:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (the configured cursor-blink interval) flips the blink
//!   phase. Ticks keep arriving while the git worker is busy, so the cursor
//!   keeps blinking during a reload.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Render cadence, independent of the blink tick.
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    ///
    /// Release and repeat events are filtered in [`spawn_event_task`] so a
    /// keystroke never toggles a selection twice.
    Key(KeyEvent),
    /// A mouse event; only wheel scrolling is acted on.
    Mouse(MouseEvent),
    /// Terminal was resized; the next frame recomputes the layout.
    Resize,
    /// Cursor-blink tick.
    Tick,
    /// Render tick.
    Render,
    /// Result from the git worker thread.
    GitResult(Box<crate::git::types::GitResultPayload>),
    /// Quit signal.
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender is cloned for the input task and the git worker; the receiver
/// is owned by the main loop and survives terminal suspensions.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that reads terminal input and drives both intervals.
///
/// The returned handle is aborted before the terminal is handed to an
/// external program, so the crossterm reader does not compete with it for
/// stdin, and respawned afterwards.
///
/// `reader.next().fuse()` keeps `select!` from polling a finished stream if
/// crossterm's reader ever terminates. Send errors are ignored: once the
/// receiver is gone the loop has already exited.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>, tick_rate: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick_interval = interval(tick_rate);
        let mut render_interval = interval(RENDER_INTERVAL);
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            tokio::select! {
                _ = tick_tick => {
                    let _ = tx.send(AppEvent::Tick);
                }
                _ = render_tick => {
                    let _ = tx.send(AppEvent::Render);
                }
                maybe_event = crossterm_event => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press {
                                let _ = tx.send(AppEvent::Key(key));
                            }
                        }
                        Some(Ok(Event::Resize(..))) => {
                            let _ = tx.send(AppEvent::Resize);
                        }
                        Some(Ok(Event::Mouse(mouse))) => {
                            let _ = tx.send(AppEvent::Mouse(mouse));
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "terminal input error");
                        }
                        None => {
                            let _ = tx.send(AppEvent::Quit);
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }
    })
}
