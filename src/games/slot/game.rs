use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::games::slot::assets::{Sprites, CUE_LOSE, CUE_SELECT, CUE_WIN};
use crate::games::slot::layout::{SceneLayout, Target};
use crate::games::slot::renderer::{ResultView, SceneView, SlotRenderer};
use crate::games::slot::round::{Reel, RoundController, RoundState, SymbolId, SymbolSource, SPIN_DURATION};
use crate::{Context, Game};

/// Reel animation speed.
const FRAMES_PER_SECOND: u64 = 12;

/// Deferred callbacks the slot game schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTimer {
    SpinElapsed,
}

/// Everything the player can ask for, whatever the input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select(SymbolId),
    Spin,
    Acknowledge,
}

#[derive(Debug)]
struct ReelAnimation {
    reel: Reel,
    step: usize,
}

pub struct SlotGame<S> {
    round: RoundController<S>,
    sprites: Sprites,
    animation: Option<ReelAnimation>,
    layout: SceneLayout,
}

impl<S: SymbolSource> SlotGame<S> {
    pub fn new(source: S, sprites: Sprites) -> Self {
        Self {
            round: RoundController::new(source),
            sprites,
            animation: None,
            layout: SceneLayout::default(),
        }
    }

    pub fn round(&self) -> &RoundController<S> {
        &self.round
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    /// Reel frame currently on screen, while spinning.
    pub fn reel_frame(&self) -> Option<SymbolId> {
        self.animation.as_ref().map(|a| a.reel.frame(a.step))
    }

    /// Single entry point for every state transition driven by the player.
    /// Rejected actions are logged and otherwise ignored.
    pub fn dispatch(&mut self, action: Action, ctx: &Context<SlotTimer>) {
        let result = match action {
            Action::Select(id) => self.round.select_symbol(id).map(|()| {
                ctx.play_cue(CUE_SELECT);
            }),
            Action::Spin => self.round.trigger_spin().map(|reel| {
                self.animation = Some(ReelAnimation { reel, step: 0 });
                ctx.schedule(SPIN_DURATION, SlotTimer::SpinElapsed);
            }),
            Action::Acknowledge => self.round.acknowledge_result(),
        };

        match result {
            Ok(()) => info!(?action, picks = self.round.selection().len(), "action applied"),
            Err(e) => debug!(?action, error = %e, "action ignored"),
        }
    }

    fn confirm_action(&self) -> Option<Action> {
        match self.round.state() {
            RoundState::Resolved(_) => Some(Action::Acknowledge),
            RoundState::Idle if self.round.can_spin() => Some(Action::Spin),
            _ => None,
        }
    }

    fn view(&self) -> SceneView<'_> {
        let result = match (self.round.state(), self.reel_frame()) {
            (RoundState::Resolved(outcome), _) => ResultView::Drawn(outcome),
            (RoundState::Spinning, Some(frame)) => ResultView::Reel(frame),
            _ => ResultView::Mystery,
        };
        SceneView {
            result,
            picks: self.round.selection(),
            accepts_picks: self.round.accepts_picks(),
            button_shown: self.round.can_spin(),
            indicator: self.round.outcome(),
        }
    }
}

impl<S: SymbolSource> Game for SlotGame<S> {
    type Message = SlotTimer;

    fn tick_rate(&self) -> Option<Duration> {
        Some(Duration::from_millis(1000 / FRAMES_PER_SECOND))
    }

    fn on_tick(&mut self, _dt: u32, _ctx: &Context<Self::Message>) {
        if let Some(animation) = self.animation.as_mut() {
            animation.step = (animation.step + 1) % animation.reel.len();
        }
    }

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context<Self::Message>) {
        let action = match event.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.confirm_action(),
            KeyCode::Char(c) => c
                .to_digit(10)
                .and_then(|d| SymbolId::new(d as u8))
                .map(Action::Select),
            _ => None,
        };
        if let Some(action) = action {
            self.dispatch(action, ctx);
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, ctx: &Context<Self::Message>) {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let target = self.layout.hit(
            event.column,
            event.row,
            self.round.can_spin(),
            self.round.outcome().is_some(),
        );
        let action = match target {
            Some(Target::Symbol(id)) => Action::Select(id),
            Some(Target::Spin) => Action::Spin,
            Some(Target::Indicator) => Action::Acknowledge,
            None => return,
        };
        self.dispatch(action, ctx);
    }

    fn handle_timer(&mut self, msg: Self::Message, ctx: &Context<Self::Message>) {
        match msg {
            SlotTimer::SpinElapsed => match self.round.resolve_spin() {
                Ok(outcome) => {
                    self.animation = None;
                    info!(drawn = %outcome.drawn, won = outcome.won, "spin resolved");
                    ctx.play_cue(if outcome.won { CUE_WIN } else { CUE_LOSE });
                }
                Err(e) => debug!(error = %e, "stale spin timer"),
            },
        }
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        self.layout = SceneLayout::new(Rect::new(0, 0, width, height));
    }

    fn render(&mut self, frame: &mut ratatui::Frame) {
        self.layout = SceneLayout::new(frame.area());
        SlotRenderer::render(frame, &self.layout, &self.view(), &self.sprites);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::AudioSink;
    use crate::games::slot::assets::AssetBundle;
    use crate::games::slot::round::REEL_LENGTH;
    use crossterm::event::KeyModifiers;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    struct Scripted(VecDeque<u8>);

    impl SymbolSource for Scripted {
        fn draw(&mut self) -> SymbolId {
            SymbolId::new(self.0.pop_front().expect("script exhausted")).unwrap()
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl AudioSink for Recorder {
        fn play(&self, cue: &str) {
            self.0.lock().unwrap().push(cue.to_string());
        }
    }

    struct Harness {
        game: SlotGame<Scripted>,
        ctx: Context<SlotTimer>,
        timers: UnboundedReceiver<SlotTimer>,
        audio: Arc<Recorder>,
    }

    fn harness(drawn: u8) -> Harness {
        let mut draws: VecDeque<u8> = (1..=REEL_LENGTH as u8).map(|i| (i % 9) + 1).collect();
        draws.push_back(drawn);
        let sprites = AssetBundle::builtin().unwrap().sprites;
        let audio = Arc::new(Recorder::default());
        let (tx, timers) = unbounded_channel();
        Harness {
            game: SlotGame::new(Scripted(draws), sprites),
            ctx: Context::new(tx, audio.clone()),
            timers,
            audio,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn center(rect: Rect) -> (u16, u16) {
        (rect.x + rect.width / 2, rect.y + rect.height / 2)
    }

    impl Harness {
        fn cues(&self) -> Vec<String> {
            self.audio.0.lock().unwrap().clone()
        }

        async fn finish_spin(&mut self) {
            let msg = self.timers.recv().await.unwrap();
            self.game.handle_timer(msg, &self.ctx);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keyboard_round_trip_win() {
        let mut h = harness(3);
        h.game.handle_input(key(KeyCode::Char('3')), &h.ctx);
        h.game.handle_input(key(KeyCode::Enter), &h.ctx);
        assert_eq!(h.game.round().state(), RoundState::Spinning);
        assert!(h.game.reel_frame().is_some());

        h.finish_spin().await;
        let outcome = h.game.round().outcome().unwrap();
        assert!(outcome.won);
        assert_eq!(h.game.reel_frame(), None);
        assert_eq!(h.cues(), vec![CUE_SELECT, CUE_WIN]);

        h.game.handle_input(key(KeyCode::Enter), &h.ctx);
        assert_eq!(h.game.round().state(), RoundState::Idle);
        assert!(h.game.round().selection().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn spin_resolves_after_two_seconds() {
        let mut h = harness(9);
        h.game.dispatch(Action::Select(SymbolId::new(1).unwrap()), &h.ctx);
        h.game.dispatch(Action::Spin, &h.ctx);

        tokio::time::advance(SPIN_DURATION - Duration::from_millis(1)).await;
        tokio::task::yield_now().await;
        assert!(h.timers.try_recv().is_err());

        h.finish_spin().await;
        assert_eq!(h.cues().last().map(String::as_str), Some(CUE_LOSE));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_spin_is_ignored() {
        let mut h = harness(2);
        h.game.dispatch(Action::Select(SymbolId::new(2).unwrap()), &h.ctx);
        h.game.dispatch(Action::Spin, &h.ctx);
        h.game.dispatch(Action::Spin, &h.ctx);

        h.finish_spin().await;
        tokio::time::advance(SPIN_DURATION * 2).await;
        tokio::task::yield_now().await;
        assert!(h.timers.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn loss_locks_clicks_on_symbols() {
        let mut h = harness(7);
        let mut terminal = ratatui::Terminal::new(ratatui::backend::TestBackend::new(100, 48)).unwrap();
        terminal.draw(|f| h.game.render(f)).unwrap();

        let (x, y) = center(h.game.layout().symbol(SymbolId::new(1).unwrap()));
        h.game.handle_mouse(click(x, y), &h.ctx);
        let (x, y) = center(h.game.layout().button);
        h.game.handle_mouse(click(x, y), &h.ctx);
        assert_eq!(h.game.round().state(), RoundState::Spinning);

        h.finish_spin().await;
        assert!(!h.game.round().outcome().unwrap().won);

        // Panel is locked until the indicator is clicked.
        let (sx, sy) = center(h.game.layout().symbol(SymbolId::new(4).unwrap()));
        h.game.handle_mouse(click(sx, sy), &h.ctx);
        assert_eq!(h.game.round().selection().len(), 1);

        let (x, y) = center(h.game.layout().indicator);
        h.game.handle_mouse(click(x, y), &h.ctx);
        assert_eq!(h.game.round().state(), RoundState::Idle);
        assert!(h.game.round().selection().is_empty());
    }

    #[test]
    fn confirm_without_picks_does_nothing() {
        let mut h = harness(1);
        h.game.handle_input(key(KeyCode::Enter), &h.ctx);
        assert_eq!(h.game.round().state(), RoundState::Idle);
        assert!(h.cues().is_empty());
    }

    #[test]
    fn digits_outside_panel_are_ignored() {
        let mut h = harness(1);
        h.game.handle_input(key(KeyCode::Char('0')), &h.ctx);
        h.game.handle_input(key(KeyCode::Char('x')), &h.ctx);
        assert!(h.game.round().selection().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_cycle_the_reel() {
        let mut h = harness(5);
        h.game.dispatch(Action::Select(SymbolId::new(5).unwrap()), &h.ctx);
        h.game.dispatch(Action::Spin, &h.ctx);

        let first = h.game.reel_frame();
        h.game.on_tick(83, &h.ctx);
        assert_ne!(h.game.reel_frame(), first);
        for _ in 1..REEL_LENGTH {
            h.game.on_tick(83, &h.ctx);
        }
        assert_eq!(h.game.reel_frame(), first);
    }
}
