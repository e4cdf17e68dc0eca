//! Randomness configuration.
//!
//! Components that need random values take an [`IdSource`] built from a
//! [`RandomnessMode`] instead of reaching for a process-wide generator.
//! Tests build a fresh seeded source per case, so nothing carries over
//! between cases.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RandomnessMode {
    /// Fresh OS randomness for every value.
    #[default]
    Entropy,
    /// Reproducible sequence derived from `seed`.
    Seeded { seed: u64 },
}

/// Generator of random identifiers.
#[derive(Debug, Clone)]
pub struct IdSource {
    mode: RandomnessMode,
    state: u64,
}

impl IdSource {
    pub fn new(mode: RandomnessMode) -> Self {
        let state = match mode {
            RandomnessMode::Entropy => 0,
            RandomnessMode::Seeded { seed } => seed,
        };
        Self { mode, state }
    }

    pub fn mode(&self) -> RandomnessMode {
        self.mode
    }

    pub fn next_id(&mut self) -> Uuid {
        match self.mode {
            RandomnessMode::Entropy => Uuid::new_v4(),
            RandomnessMode::Seeded { .. } => {
                let mut bytes = [0u8; 16];
                bytes[..8].copy_from_slice(&self.next_u64().to_le_bytes());
                bytes[8..].copy_from_slice(&self.next_u64().to_le_bytes());
                uuid::Builder::from_random_bytes(bytes).into_uuid()
            }
        }
    }

    // splitmix64
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}
