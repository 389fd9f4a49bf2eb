/// Core game interface for the slotterm engine
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyEvent, MouseEvent};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::core::audio::AudioSink;

/// Handle a game uses to talk back to the engine
pub struct Context<M> {
    tx: UnboundedSender<M>,
    audio: Arc<dyn AudioSink>,
}

impl<M: Send + 'static> Context<M> {
    pub fn new(tx: UnboundedSender<M>, audio: Arc<dyn AudioSink>) -> Self {
        Self { tx, audio }
    }

    /// One-shot deferred callback: `msg` comes back through `Game::handle_timer`
    /// once `delay` has passed. There is no way to cancel it.
    pub fn schedule(&self, delay: Duration, msg: M) {
        let deadline = Instant::now() + delay;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            sleep_until(deadline).await;
            if tx.send(msg).is_err() {
                trace!("timer fired after the engine stopped");
            }
        });
    }

    /// Fire-and-forget audio cue
    pub fn play_cue(&self, cue: &str) {
        self.audio.play(cue);
    }
}

/// Main game trait that all games must implement
pub trait Game {
    /// Payload of deferred callbacks scheduled through the `Context`
    type Message: Send + 'static;

    /// How often `on_tick` runs, or `None` for games without animation
    fn tick_rate(&self) -> Option<Duration>;
    fn on_tick(&mut self, dt: u32, ctx: &Context<Self::Message>);

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context<Self::Message>);
    fn handle_mouse(&mut self, _event: MouseEvent, _ctx: &Context<Self::Message>) {}
    fn handle_timer(&mut self, msg: Self::Message, ctx: &Context<Self::Message>);

    /// Viewport changed size
    fn on_resize(&mut self, _width: u16, _height: u16) {}

    fn render(&mut self, frame: &mut ratatui::Frame);
}
