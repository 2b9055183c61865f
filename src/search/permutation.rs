use sha2::{Digest, Sha256};

const ROUNDS: u32 = 4;

/// Derive a 64-bit key from a seed and context words
pub fn derive_key(seed: u64, context: &[u64]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    for word in context {
        hasher.update(word.to_le_bytes());
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Keyed bijection over `[0, len)`, evaluated one index at a time.
///
/// A balanced Feistel network over the smallest domain `4^h >= len`, walked
/// back into range when an image lands outside it.
#[derive(Debug, Clone, Copy)]
pub struct Permutation {
    key: u64,
    len: u64,
    half_bits: u32,
}

impl Permutation {
    pub fn new(key: u64, len: u64) -> Self {
        let bits = if len <= 1 {
            0
        } else {
            u64::BITS - (len - 1).leading_zeros()
        };

        Self {
            key,
            len,
            half_bits: bits.div_ceil(2),
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Image of `index`. `index` must be below `len`.
    pub fn apply(&self, index: u64) -> u64 {
        debug_assert!(index < self.len, "index {index} out of range {}", self.len);
        if self.len <= 1 {
            return index;
        }

        let mut value = self.feistel(index);
        while value >= self.len {
            value = self.feistel(value);
        }
        value
    }

    fn feistel(&self, value: u64) -> u64 {
        let mask = (1u64 << self.half_bits) - 1;
        let mut left = value >> self.half_bits;
        let mut right = value & mask;

        for round in 0..ROUNDS {
            let next = left ^ (self.round_function(round, right) & mask);
            left = right;
            right = next;
        }

        (left << self.half_bits) | right
    }

    fn round_function(&self, round: u32, value: u64) -> u64 {
        derive_key(self.key, &[u64::from(round), value])
    }

    /// All images in index order. Intended for small domains and tests.
    pub fn to_vec(&self) -> Vec<u64> {
        (0..self.len).map(|i| self.apply(i)).collect()
    }
}
