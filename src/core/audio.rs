/// Fire-and-forget audio cues.
use std::collections::BTreeMap;
use std::io::{stdout, Write};

use tracing::{trace, warn};

/// Anything that can play a named cue. No completion is reported back.
pub trait AudioSink: Send + Sync {
    fn play(&self, cue: &str);
}

/// Rings the terminal bell a configured number of times per cue.
#[derive(Debug, Clone, Default)]
pub struct TerminalBell {
    bells: BTreeMap<String, u8>,
}

impl TerminalBell {
    pub fn new(bells: BTreeMap<String, u8>) -> Self {
        Self { bells }
    }
}

impl AudioSink for TerminalBell {
    fn play(&self, cue: &str) {
        let Some(&count) = self.bells.get(cue) else {
            warn!(cue, "unknown audio cue");
            return;
        };
        trace!(cue, count, "ringing bell");
        let mut out = stdout();
        let rung = out
            .write_all(&vec![0x07; usize::from(count)])
            .and_then(|_| out.flush());
        if let Err(e) = rung {
            warn!(cue, error = ?e, "failed to ring bell");
        }
    }
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Muted;

impl AudioSink for Muted {
    fn play(&self, cue: &str) {
        trace!(cue, "muted cue");
    }
}
