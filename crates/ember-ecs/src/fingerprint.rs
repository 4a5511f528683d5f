//! Archetype fingerprints.
//!
//! A [`Fingerprint`] is a bitset with one bit per registered component:
//! bit `i` is set iff the associated entity or archetype contains the
//! component at dense index `i`. Fingerprints key the archetype registry,
//! so equality and hashing are value-based over the bit pattern and ignore
//! how wide the backing word vector happens to be.

use std::hash::{Hash, Hasher};

const WORD_BITS: usize = u64::BITS as usize;

/// A growable bitset keyed on dense component indices.
#[derive(Clone, Default)]
pub struct Fingerprint {
    words: Vec<u64>,
}

impl Fingerprint {
    /// The empty fingerprint.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty fingerprint pre-sized for `bits` bits, so that setting any
    /// bit below `bits` never reallocates. The catalogue's component count
    /// after the lock is the natural capacity.
    pub fn with_bit_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(WORD_BITS)],
        }
    }

    /// Set or clear the bit at `index`, growing the word vector as needed.
    pub fn set(&mut self, index: usize, value: bool) {
        let word = index / WORD_BITS;
        let mask = 1u64 << (index % WORD_BITS);

        if value {
            if word >= self.words.len() {
                self.words.resize(word + 1, 0);
            }
            self.words[word] |= mask;
        } else if word < self.words.len() {
            self.words[word] &= !mask;
        }
    }

    /// Whether the bit at `index` is set.
    pub fn get(&self, index: usize) -> bool {
        let word = index / WORD_BITS;
        let mask = 1u64 << (index % WORD_BITS);
        self.words.get(word).is_some_and(|bits| bits & mask != 0)
    }

    /// Superset test: whether every bit set in `other` is also set in
    /// `self`.
    pub fn includes(&self, other: &Fingerprint) -> bool {
        other
            .words
            .iter()
            .enumerate()
            .all(|(index, &bits)| self.words.get(index).copied().unwrap_or(0) & bits == bits)
    }

    /// Number of set bits.
    pub fn true_count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// The word pattern with trailing zero words trimmed; the canonical
    /// value for equality and hashing.
    fn trimmed(&self) -> &[u64] {
        let mut length = self.words.len();
        while length > 0 && self.words[length - 1] == 0 {
            length -= 1;
        }
        &self.words[..length]
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.trimmed() == other.trimmed()
    }
}

impl Eq for Fingerprint {}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.trimmed().hash(state);
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set_bits: Vec<usize> = (0..self.words.len() * WORD_BITS)
            .filter(|&index| self.get(index))
            .collect();
        write!(f, "Fingerprint{set_bits:?}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
