use std::{
    io::{stdout, Stdout},
    ops::{Deref, DerefMut},
    time::{Duration, Instant},
};

use color_eyre::eyre::Result;
use crossterm::{
    cursor,
    event::{
        DisableFocusChange, EnableFocusChange, Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{FutureExt, StreamExt};
use ratatui::backend::CrosstermBackend as Backend;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::clock::FrameClock;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Init,
    Error,
    /// Clamped seconds since the previous frame.
    Frame(f32),
    FocusGained,
    FocusLost,
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Produces `Event::Frame` at a fixed rate, plus terminal input when enabled.
///
/// The pump never touches game state. Once cancelled it delivers nothing, even events that are
/// already queued.
pub struct EventPump {
    frame_rate: f64,
    max_dt: f32,
    terminal_input: bool,
    cancellation_token: CancellationToken,
    task: Option<JoinHandle<()>>,
    event_rx: UnboundedReceiver<Event>,
    event_tx: UnboundedSender<Event>,
}

impl EventPump {
    pub fn new(frame_rate: f64, max_dt: f32) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            frame_rate,
            max_dt,
            terminal_input: true,
            cancellation_token: CancellationToken::new(),
            task: None,
            event_rx,
            event_tx,
        }
    }

    /// Whether to read crossterm events. Off in tests, where there is no terminal.
    pub fn terminal_input(mut self, enabled: bool) -> Self {
        self.terminal_input = enabled;
        self
    }

    pub fn start(&mut self) {
        self.cancel();
        // drop anything left over from a previous run
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_tx = event_tx;
        self.event_rx = event_rx;
        self.cancellation_token = CancellationToken::new();

        let period = Duration::from_secs_f64(1.0 / self.frame_rate.max(1.0));
        let max_dt = self.max_dt;
        let terminal_input = self.terminal_input;
        let cancellation_token = self.cancellation_token.clone();
        let event_tx = self.event_tx.clone();

        self.task = Some(tokio::spawn(async move {
            let mut reader = terminal_input.then(EventStream::new);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut clock = FrameClock::new(Instant::now(), max_dt);
            if event_tx.send(Event::Init).is_err() {
                return;
            }
            loop {
                let mut input_closed = false;
                let crossterm_event = async {
                    match reader.as_mut() {
                        Some(reader) => reader.next().await,
                        None => std::future::pending().await,
                    }
                };
                let event = tokio::select! {
                    _ = cancellation_token.cancelled() => break,
                    _ = interval.tick() => Some(Event::Frame(clock.tick(Instant::now()))),
                    maybe_event = crossterm_event.fuse() => match maybe_event {
                        Some(Ok(event)) => translate(event),
                        Some(Err(e)) => {
                            tracing::error!("terminal input failed: {e}");
                            Some(Event::Error)
                        },
                        None => {
                            input_closed = true;
                            None
                        },
                    },
                };
                if input_closed {
                    reader = None;
                }
                if let Some(event) = event {
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
            }
        }));
    }

    /// Stops the pump. Calling it again is a no-op.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    pub async fn next(&mut self) -> Option<Event> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => None,
            event = self.event_rx.recv() => event,
        }
    }

    /// Cancels and waits briefly for the task to wind down, aborting it if it does not.
    pub async fn stop(&mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let abort = task.abort_handle();
            if tokio::time::timeout(Duration::from_millis(100), task).await.is_err() {
                tracing::warn!("event pump did not stop in time, aborting");
                abort.abort();
            }
        }
    }
}

fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Key(_) => None,
        CrosstermEvent::Resize(x, y) => Some(Event::Resize(x, y)),
        CrosstermEvent::FocusLost => Some(Event::FocusLost),
        CrosstermEvent::FocusGained => Some(Event::FocusGained),
        // neither mouse capture nor bracketed paste is enabled
        CrosstermEvent::Mouse(_) | CrosstermEvent::Paste(_) => None,
    }
}

pub struct Tui {
    pub terminal: ratatui::Terminal<Backend<Stdout>>,
    pub pump: EventPump,
}

impl Tui {
    pub fn new(frame_rate: f64, max_dt: f32) -> Result<Self> {
        let terminal = ratatui::Terminal::new(Backend::new(stdout()))?;
        Ok(Self { terminal, pump: EventPump::new(frame_rate, max_dt) })
    }

    pub fn enter(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(stdout(), EnterAlternateScreen, cursor::Hide, EnableFocusChange)?;
        self.pump.start();
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.pump.cancel();
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            restore()?;
        }
        Ok(())
    }

    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::signal::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.pump.next().await
    }
}

/// Puts the terminal back into cooked mode. Safe to call from the panic hook.
pub fn restore() -> Result<()> {
    if crossterm::terminal::is_raw_mode_enabled()? {
        crossterm::execute!(stdout(), DisableFocusChange, LeaveAlternateScreen, cursor::Show)?;
        crossterm::terminal::disable_raw_mode()?;
    }
    Ok(())
}

impl Deref for Tui {
    type Target = ratatui::Terminal<Backend<Stdout>>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            tracing::error!("failed to restore terminal: {e:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers, MouseEventKind};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::constants::game::MAX_DT;

    #[test]
    fn test_translate_keeps_what_the_app_uses() {
        let press = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let mut release = press;
        release.kind = KeyEventKind::Release;
        let mouse = crossterm::event::MouseEvent {
            kind: MouseEventKind::Moved,
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };

        assert_eq!(translate(CrosstermEvent::Key(press)), Some(Event::Key(press)));
        assert_eq!(translate(CrosstermEvent::Key(release)), None);
        assert_eq!(translate(CrosstermEvent::FocusLost), Some(Event::FocusLost));
        assert_eq!(translate(CrosstermEvent::Resize(80, 24)), Some(Event::Resize(80, 24)));
        assert_eq!(translate(CrosstermEvent::Mouse(mouse)), None);
        assert_eq!(translate(CrosstermEvent::Paste("flap".to_string())), None);
    }

    #[tokio::test]
    async fn test_frames_are_clamped() {
        let mut pump = EventPump::new(200.0, MAX_DT).terminal_input(false);
        pump.start();
        assert_eq!(pump.next().await, Some(Event::Init));
        for _ in 0..5 {
            match pump.next().await {
                Some(Event::Frame(dt)) => assert!((0.0..=MAX_DT).contains(&dt)),
                other => panic!("expected a frame, got {other:?}"),
            }
        }
        pump.stop().await;
    }

    #[tokio::test]
    async fn test_nothing_after_cancel() {
        let mut pump = EventPump::new(500.0, MAX_DT).terminal_input(false);
        pump.start();
        assert_eq!(pump.next().await, Some(Event::Init));
        // let a backlog build up
        tokio::time::sleep(Duration::from_millis(50)).await;
        pump.cancel();
        pump.cancel();
        assert!(pump.is_cancelled());
        assert_eq!(pump.next().await, None);
        assert_eq!(pump.next().await, None);
        pump.stop().await;
    }

    #[tokio::test]
    async fn test_restart_after_cancel() {
        let mut pump = EventPump::new(100.0, MAX_DT).terminal_input(false);
        pump.start();
        pump.cancel();
        pump.start();
        assert!(!pump.is_cancelled());
        assert_eq!(pump.next().await, Some(Event::Init));
        pump.stop().await;
    }
}
