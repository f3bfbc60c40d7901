//! SHA-256 fingerprint of a snapshot.
//!
//! Covers everything that determines how play continues: food, capsules,
//! agent poses and timers, score and outcome. Floats are hashed by bit
//! pattern, so two fingerprints match only for bit-identical snapshots.

use sha2::{Digest, Sha256};

use crate::action::Direction;

use super::GameStateData;

impl GameStateData {
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        for word in self.food.pack() {
            hasher.update(word.to_le_bytes());
        }

        hasher.update((self.capsules.len() as u64).to_le_bytes());
        for capsule in self.capsules.iter() {
            hasher.update(capsule.x.to_le_bytes());
            hasher.update(capsule.y.to_le_bytes());
        }

        hasher.update((self.agents.len() as u64).to_le_bytes());
        for agent in self.agents() {
            let position = agent.position();
            hasher.update((position.x + 0.0).to_bits().to_le_bytes());
            hasher.update((position.y + 0.0).to_bits().to_le_bytes());
            hasher.update([direction_tag(agent.direction())]);
            hasher.update(agent.scared_timer.to_le_bytes());
        }

        hasher.update(self.score.to_le_bytes());
        hasher.update([u8::from(self.win), u8::from(self.lose)]);

        hasher.finalize().into()
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

fn direction_tag(direction: Direction) -> u8 {
    match direction {
        Direction::North => 0,
        Direction::South => 1,
        Direction::East => 2,
        Direction::West => 3,
        Direction::Stop => 4,
    }
}
