//! Event plumbing for the TUI
//!
//! A spawned poller thread turns crossterm events into [`AppEvent`]s and
//! pushes them down one unbounded channel, interleaved with a periodic
//! tick. Completed generation requests re-enter the same channel as
//! [`AppEvent::Generation`], so the update loop only ever sees one ordered
//! stream and never touches shared mutable state.

use std::thread;
use std::time::Duration;

use crossterm::event as crossterm_event;
use crossterm::event::KeyEventKind;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use gdforge_session::{RequestTicket, ToolResponse};

/// Everything the update loop can react to.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A key press from the terminal
    Key(crossterm_event::KeyEvent),
    /// The terminal was resized
    Resize {
        /// New width in columns
        width: u16,
        /// New height in rows
        height: u16,
    },
    /// Periodic tick for spinner animation
    Tick,
    /// A generation request finished
    Generation {
        /// Correlation ticket handed out when the request began
        ticket: RequestTicket,
        /// Success or failure of the request
        response: ToolResponse,
    },
}

/// The event source the run loop drains.
pub struct EventLoop {
    rx: UnboundedReceiver<AppEvent>,
    tx: UnboundedSender<AppEvent>,
}

impl EventLoop {
    /// Starts the poller thread and hands back the channel ends.
    ///
    /// The thread polls crossterm with a 10ms timeout and emits a tick
    /// every 250ms; it exits on its own once every receiver is gone.
    pub fn new() -> Self {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        thread::spawn(move || {
            let tick_interval = Duration::from_millis(250);
            let poll_timeout = Duration::from_millis(10);
            let mut last_tick = std::time::Instant::now();

            loop {
                if crossterm_event::poll(poll_timeout).unwrap_or(false) {
                    if let Ok(event) = crossterm_event::read() {
                        if let Some(app_event) = convert_crossterm_event(event) {
                            if tx_clone.send(app_event).is_err() {
                                break;
                            }
                        }
                    }
                }

                if last_tick.elapsed() >= tick_interval {
                    if tx_clone.send(AppEvent::Tick).is_err() {
                        break;
                    }
                    last_tick = std::time::Instant::now();
                }
            }
        });

        Self { rx, tx }
    }

    /// A sender handle for feeding completed generations back in.
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Waits for the next event. `None` means every sender hung up.
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a crossterm event onto the app's event type.
///
/// Key releases and repeats are dropped so held keys do not double-fire
/// on platforms that report them.
fn convert_crossterm_event(event: crossterm_event::Event) -> Option<AppEvent> {
    match event {
        crossterm_event::Event::Key(key) if key.kind == KeyEventKind::Press => {
            Some(AppEvent::Key(key))
        }
        crossterm_event::Event::Resize(width, height) => Some(AppEvent::Resize { width, height }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn key_presses_are_forwarded() {
        let event = crossterm_event::Event::Key(KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
        ));
        assert!(matches!(
            convert_crossterm_event(event),
            Some(AppEvent::Key(_))
        ));
    }

    #[test]
    fn key_releases_are_dropped() {
        let mut key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(convert_crossterm_event(crossterm_event::Event::Key(key)).is_none());
    }

    #[test]
    fn resizes_carry_the_new_dimensions() {
        let event = crossterm_event::Event::Resize(80, 24);
        assert!(matches!(
            convert_crossterm_event(event),
            Some(AppEvent::Resize {
                width: 80,
                height: 24
            })
        ));
    }
}
