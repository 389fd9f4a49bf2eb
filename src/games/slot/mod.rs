pub mod assets;
pub mod game;
pub mod layout;
pub mod renderer;
pub mod round;

pub use assets::{AssetBundle, AssetError};
pub use game::{Action, SlotGame, SlotTimer};
pub use round::{Outcome, RandomSymbols, RoundController, RoundError, RoundState, SymbolId, SymbolSource};

use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::DefaultTerminal;
use tracing::info;

use crate::core::audio::AudioSink;
use crate::core::engine::Engine;

/// Game runner for the slot machine
pub async fn run_game(
    bundle: AssetBundle,
    seed: Option<u64>,
    audio: Arc<dyn AudioSink>,
    terminal: DefaultTerminal,
) -> Result<()> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    info!(seeded = seed.is_some(), "slot game starting");
    let game = SlotGame::new(RandomSymbols::new(rng), bundle.sprites);
    let engine = Engine::new(game, audio);
    engine.run(terminal).await
}
