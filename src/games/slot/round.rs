/// Round state machine: selection, spin, resolution and reset.
///
/// This is pure game logic with no UI or timer concerns. The host decides
/// when the spin delay has elapsed and calls `resolve_spin`.
use std::fmt;
use std::time::Duration;

use rand::Rng;
use rand_core::RngCore;
use thiserror::Error;

pub const SYMBOL_COUNT: u8 = 9;
pub const MAX_PICKS: usize = 5;
/// Number of cosmetic frames drawn for the reel animation.
pub const REEL_LENGTH: usize = 12;
pub const SPIN_DURATION: Duration = Duration::from_millis(2000);

/// One of the nine symbols, always in `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u8);

impl SymbolId {
    pub fn new(id: u8) -> Option<Self> {
        (1..=SYMBOL_COUNT).contains(&id).then_some(Self(id))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position, handy for indexing per-symbol arrays.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    pub fn all() -> impl Iterator<Item = SymbolId> {
        (1..=SYMBOL_COUNT).map(SymbolId)
    }
}

impl TryFrom<u8> for SymbolId {
    type Error = RoundError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id).ok_or(RoundError::InvalidSymbol(id))
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where symbol draws come from.
pub trait SymbolSource {
    /// Draw one symbol uniformly from `1..=9`.
    fn draw(&mut self) -> SymbolId;
}

/// Uniform draws backed by any `RngCore`.
#[derive(Debug, Clone)]
pub struct RandomSymbols<R>(R);

impl<R: RngCore> RandomSymbols<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: RngCore> SymbolSource for RandomSymbols<R> {
    fn draw(&mut self) -> SymbolId {
        SymbolId(self.0.random_range(1..=SYMBOL_COUNT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub drawn: SymbolId,
    pub won: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Player is picking symbols (0 to 5 picks).
    Idle,
    /// Reel is animating; selection is locked and nothing can interrupt it.
    Spinning,
    /// Win or lose indicator is up, waiting for acknowledgement.
    Resolved(Outcome),
}

/// Cosmetic frames shown while the reel spins. Has no bearing on the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reel {
    frames: Vec<SymbolId>,
}

impl Reel {
    pub fn frames(&self) -> &[SymbolId] {
        &self.frames
    }

    /// Frame at `step`, looping over the reel.
    pub fn frame(&self, step: usize) -> SymbolId {
        self.frames[step % self.frames.len()]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("symbol {0} is outside 1..=9")]
    InvalidSymbol(u8),
    #[error("selection already holds {} picks", MAX_PICKS)]
    SelectionFull,
    #[error("selection is locked")]
    SelectionLocked,
    #[error("no symbols selected")]
    NotReady,
    #[error("a spin is already in progress")]
    AlreadySpinning,
    #[error("result must be acknowledged first")]
    AwaitingAcknowledge,
    #[error("no spin in progress")]
    NotSpinning,
    #[error("no result to acknowledge")]
    NotResolved,
}

/// Owns the selection set and the round lifecycle.
#[derive(Debug)]
pub struct RoundController<S> {
    source: S,
    selection: Vec<SymbolId>,
    state: RoundState,
    selection_enabled: bool,
}

impl<S: SymbolSource> RoundController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            selection: Vec::with_capacity(MAX_PICKS),
            state: RoundState::Idle,
            selection_enabled: true,
        }
    }

    /// Record a pick. Duplicates are accepted.
    pub fn select_symbol(&mut self, id: SymbolId) -> Result<(), RoundError> {
        if !self.accepts_picks() {
            return Err(RoundError::SelectionLocked);
        }
        if self.selection.len() >= MAX_PICKS {
            return Err(RoundError::SelectionFull);
        }
        self.selection.push(id);
        Ok(())
    }

    /// Start a spin and return the cosmetic reel to animate.
    pub fn trigger_spin(&mut self) -> Result<Reel, RoundError> {
        match self.state {
            RoundState::Spinning => return Err(RoundError::AlreadySpinning),
            RoundState::Resolved(_) => return Err(RoundError::AwaitingAcknowledge),
            RoundState::Idle => {}
        }
        if self.selection.is_empty() {
            return Err(RoundError::NotReady);
        }

        let frames = (0..REEL_LENGTH).map(|_| self.source.draw()).collect();
        self.state = RoundState::Spinning;
        Ok(Reel { frames })
    }

    /// Draw the deciding symbol once the spin delay has elapsed.
    pub fn resolve_spin(&mut self) -> Result<Outcome, RoundError> {
        if self.state != RoundState::Spinning {
            return Err(RoundError::NotSpinning);
        }

        let drawn = self.source.draw();
        let outcome = Outcome {
            drawn,
            won: self.selection.contains(&drawn),
        };
        // Only a loss locks the panel until the result is acknowledged.
        if !outcome.won {
            self.selection_enabled = false;
        }
        self.state = RoundState::Resolved(outcome);
        Ok(outcome)
    }

    pub fn acknowledge_result(&mut self) -> Result<(), RoundError> {
        if !matches!(self.state, RoundState::Resolved(_)) {
            return Err(RoundError::NotResolved);
        }
        self.selection.clear();
        self.selection_enabled = true;
        self.state = RoundState::Idle;
        Ok(())
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn selection(&self) -> &[SymbolId] {
        &self.selection
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            RoundState::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether the symbol has been picked at least once this round.
    pub fn is_active(&self, id: SymbolId) -> bool {
        self.selection.contains(&id)
    }

    /// The spin control is exposed only when a spin would be accepted.
    pub fn can_spin(&self) -> bool {
        self.state == RoundState::Idle && !self.selection.is_empty()
    }

    pub fn accepts_picks(&self) -> bool {
        self.state != RoundState::Spinning && self.selection_enabled
    }
}
