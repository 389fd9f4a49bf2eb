use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::core::audio::AudioSink;
use crate::{Context, Game};

/// Redraw cadence for games that do not tick.
const IDLE_FRAME: Duration = Duration::from_millis(250);

pub struct Engine<G: Game> {
    game: G,
    audio: Arc<dyn AudioSink>,
}

impl<G: Game> Engine<G> {
    pub fn new(game: G, audio: Arc<dyn AudioSink>) -> Self {
        Self { game, audio }
    }

    /// Run until the player quits. Mouse capture is switched on for the
    /// duration of the loop and released even if the loop fails.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut out = stdout();
        execute!(out, EnableMouseCapture)?;
        let result = self.event_loop(&mut terminal).await;
        if let Err(e) = execute!(out, DisableMouseCapture) {
            warn!(error = ?e, "failed to release mouse capture");
        }
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let (timer_tx, mut timer_rx) = tokio::sync::mpsc::unbounded_channel::<G::Message>();
        let ctx = Context::new(timer_tx, self.audio.clone());
        let mut events = EventStream::new();

        let size = terminal.size()?;
        self.game.on_resize(size.width, size.height);

        let tick_rate = self.game.tick_rate();
        let mut ticker = tokio::time::interval(tick_rate.unwrap_or(IDLE_FRAME));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_tick = Instant::now();

        info!(?tick_rate, "engine started");
        loop {
            terminal.draw(|f| self.game.render(f))?;

            tokio::select! {
                // 1. INPUT: keys, clicks and resizes from the terminal
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if !self.handle_event(event, &ctx) {
                            break;
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },

                // 2. TIMERS: deferred callbacks scheduled by the game
                Some(msg) = timer_rx.recv() => {
                    self.game.handle_timer(msg, &ctx);
                }

                // 3. TICK: animation heartbeat
                _ = ticker.tick() => {
                    if tick_rate.is_some() {
                        let dt = last_tick.elapsed().as_millis() as u32;
                        last_tick = Instant::now();
                        self.game.on_tick(dt, &ctx);
                    }
                }
            }
        }

        info!("engine stopped");
        Ok(())
    }

    /// Returns `false` when the player asked to quit.
    fn handle_event(&mut self, event: Event, ctx: &Context<G::Message>) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if is_quit(&key) {
                    return false;
                }
                self.game.handle_input(key, ctx);
            }
            Event::Mouse(mouse) => self.game.handle_mouse(mouse, ctx),
            Event::Resize(width, height) => {
                debug!(width, height, "viewport resized");
                self.game.on_resize(width, height);
            }
            _ => {}
        }
        true
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
