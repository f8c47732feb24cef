//! Fixed-universe bit set for node subsets.
//!
//! Every algorithm in this crate takes and returns node subsets as [`BitSet`]s.
//! A set is created over a universe `0..n` and never grows: touching an index
//! outside the universe is a logic error and panics.

use std::fmt;

/// A set of node indices over a fixed universe `0..universe`, backed by a vector of u64 words.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of valid indices
    universe: usize,
    /// Number of set bits (cached for O(1) len())
    count: usize,
}

impl BitSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set over the universe `0..universe`.
    pub fn new(universe: usize) -> Self {
        let num_words = universe.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            universe,
            count: 0,
        }
    }

    /// Creates a set containing every index of `0..universe`.
    pub fn full(universe: usize) -> Self {
        let mut set = Self::new(universe);
        set.flip_range(0, universe);
        set
    }

    /// Creates a set over `0..universe` from the given indices.
    pub fn from_indices(universe: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(universe);
        set.extend(indices);
        set
    }

    /// Returns the size of the universe this set ranges over.
    #[inline]
    pub fn universe(&self) -> usize {
        self.universe
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Same as [`len`](Self::len).
    #[inline]
    pub fn cardinality(&self) -> usize {
        self.count
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Gets the word index and bit position for a given bit index.
    #[inline]
    fn word_and_bit(&self, index: usize) -> (usize, usize) {
        assert!(
            index < self.universe,
            "Node index {} out of range 0..{}",
            index,
            self.universe
        );
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Returns true if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        (self.words[word_idx] >> bit_idx) & 1 != 0
    }

    /// Same as [`contains`](Self::contains).
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.contains(index)
    }

    /// Sets the bit at the given index. Returns true if the bit was not previously set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_clear = (self.words[word_idx] & mask) == 0;
        if was_clear {
            self.words[word_idx] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Clears the bit at the given index. Returns true if the bit was previously set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let (word_idx, bit_idx) = self.word_and_bit(index);
        let mask = 1u64 << bit_idx;
        let was_set = (self.words[word_idx] & mask) != 0;
        if was_set {
            self.words[word_idx] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    /// Sets the bit at the given index.
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.insert(index);
    }

    /// Clears the bit at the given index.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        self.remove(index);
    }

    /// Clears all bits.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    /// Returns the smallest set index that is `>= from`, if any.
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        if from >= self.universe {
            return None;
        }
        let (mut word_idx, bit_idx) = (from / Self::BITS_PER_WORD, from % Self::BITS_PER_WORD);
        let mut word = self.words[word_idx] & (u64::MAX << bit_idx);
        loop {
            if word != 0 {
                return Some(word_idx * Self::BITS_PER_WORD + word.trailing_zeros() as usize);
            }
            word_idx += 1;
            if word_idx >= self.words.len() {
                return None;
            }
            word = self.words[word_idx];
        }
    }

    /// Flips every bit in `lo..hi`.
    pub fn flip_range(&mut self, lo: usize, hi: usize) {
        assert!(lo <= hi, "Invalid range {}..{}", lo, hi);
        assert!(
            hi <= self.universe,
            "Range {}..{} exceeds universe 0..{}",
            lo,
            hi,
            self.universe
        );
        for index in lo..hi {
            let mask = 1u64 << (index % Self::BITS_PER_WORD);
            self.words[index / Self::BITS_PER_WORD] ^= mask;
        }
        self.recount();
    }

    /// In-place union (`self |= other`).
    pub fn union_with(&mut self, other: &BitSet) {
        self.check_universe(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
        self.recount();
    }

    /// In-place intersection (`self &= other`).
    pub fn intersect_with(&mut self, other: &BitSet) {
        self.check_universe(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
        self.recount();
    }

    /// In-place difference (`self &= !other`).
    pub fn difference_with(&mut self, other: &BitSet) {
        self.check_universe(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
        self.recount();
    }

    /// Returns true if every element of `self` is also in `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.check_universe(other);
        self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    /// Collects the set indices in increasing order.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Returns an iterator over all set bit indices, in increasing order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            bitset: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }

    fn check_universe(&self, other: &BitSet) {
        assert_eq!(
            self.universe, other.universe,
            "Bit sets range over different universes"
        );
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }
}

impl Extend<usize> for BitSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.insert(index);
        }
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = BitSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over set bits in a BitSet.
pub struct BitSetIter<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(self.word_idx * BitSet::BITS_PER_WORD + bit_idx);
            }

            self.word_idx += 1;
            if self.word_idx >= self.bitset.words.len() {
                return None;
            }
            self.current_word = self.bitset.words[self.word_idx];
        }
    }
}
