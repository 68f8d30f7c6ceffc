use sha2::{Digest, Sha256};

use crate::types::WinnerCounts;

/// Source of uniformly distributed 64-bit words.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Uniform integer in `0..bound`, without modulo bias.
    ///
    /// Words below `2^64 mod bound` are rejected so that every residue is
    /// backed by the same number of accepted words. `bound <= 1` yields 0.
    fn below(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let word = self.next_u64();
            if word >= threshold {
                return word % bound;
            }
        }
    }
}

/// SHA-256 counter-mode generator.
///
/// `block_n = sha256(seed || n_be)`; words are read big-endian, four per block.
pub struct HashRng {
    seed: [u8; 32],
    counter: u64,
    block: [u8; 32],
    offset: usize,
}

impl HashRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            counter: 0,
            block: [0u8; 32],
            offset: 32,
        }
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.block = hasher.finalize().into();
        self.counter += 1;
        self.offset = 0;
    }
}

impl RandomSource for HashRng {
    fn next_u64(&mut self) -> u64 {
        if self.offset + 8 > self.block.len() {
            self.refill();
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.block[self.offset..self.offset + 8]);
        self.offset += 8;
        u64::from_be_bytes(word)
    }
}

/// Disjoint primary and backup picks, each in rank order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection<T> {
    pub primary: Vec<T>,
    pub backup: Vec<T>,
}

/// Counts that can actually be honoured with `participants` entrants.
///
/// Primary slots are filled first; backups only get what is left over.
pub fn actual_counts(participants: usize, requested: WinnerCounts) -> WinnerCounts {
    let available = u32::try_from(participants).unwrap_or(u32::MAX);
    let primary = requested.primary.min(available);
    let backup = requested.backup.min(available - primary);
    WinnerCounts { primary, backup }
}

/// Partition `participants` into randomly chosen primary and backup winners.
///
/// Runs a partial Fisher-Yates shuffle over a copy of the input, stopping once
/// every requested position is filled, so each entrant is equally likely to
/// land in any output slot.
pub fn select_winners<T, R>(participants: &[T], requested: WinnerCounts, rng: &mut R) -> Selection<T>
where
    T: Clone,
    R: RandomSource + ?Sized,
{
    let counts = actual_counts(participants.len(), requested);
    let primary = counts.primary as usize;
    let take = counts.total() as usize;

    let mut deck = participants.to_vec();
    let len = deck.len();
    for i in 0..take {
        let j = i + rng.below((len - i) as u64) as usize;
        deck.swap(i, j);
    }
    deck.truncate(take);
    let backup = deck.split_off(primary);

    Selection {
        primary: deck,
        backup,
    }
}
