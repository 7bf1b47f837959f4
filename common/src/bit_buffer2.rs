//! Bit-packed 2D buffer for boolean masks.
//!
//! Rows are padded to a whole number of `u64` words so that a row can be
//! scanned word-at-a-time and rows can be filled independently in parallel.
//! Padding bits past `width` are always zero.

use rayon::prelude::*;

/// Number of bits per storage word.
const BITS_PER_WORD: usize = 64;

/// A 2D buffer storing boolean values packed as bits, one padded word run per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer2 {
    words: Vec<u64>,
    width: usize,
    height: usize,
    words_per_row: usize,
}

/// Mask selecting bits `lo..hi` of a word (`hi <= 64`).
#[inline]
fn bit_range_mask(lo: usize, hi: usize) -> u64 {
    debug_assert!(lo <= hi && hi <= BITS_PER_WORD);
    let upper = if hi == BITS_PER_WORD {
        !0u64
    } else {
        (1u64 << hi) - 1
    };
    upper & !((1u64 << lo) - 1)
}

impl BitBuffer2 {
    /// Create a new bit buffer filled with the given value.
    pub fn new_filled(width: usize, height: usize, value: bool) -> Self {
        let words_per_row = width.div_ceil(BITS_PER_WORD);
        let mut buffer = Self {
            words: vec![0u64; words_per_row * height],
            width,
            height,
            words_per_row,
        };
        if value {
            buffer.fill(true);
        }
        buffer
    }

    /// Create a new bit buffer with all bits set to false.
    #[inline]
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, false)
    }

    /// Create a bit buffer by evaluating `f(x, y)` for every pixel.
    ///
    /// Rows are evaluated in parallel.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> bool + Sync,
    {
        let mut buffer = Self::new_default(width, height);
        buffer.par_fill_with(f);
        buffer
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of addressable bits (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of storage words backing one row.
    #[inline]
    pub fn words_per_row(&self) -> usize {
        self.words_per_row
    }

    #[inline]
    pub fn get_xy(&self, x: usize, y: usize) -> bool {
        debug_assert!(x < self.width && y < self.height);
        let word = self.words[y * self.words_per_row + x / BITS_PER_WORD];
        (word >> (x % BITS_PER_WORD)) & 1 != 0
    }

    #[inline]
    pub fn set_xy(&mut self, x: usize, y: usize, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        let word = &mut self.words[y * self.words_per_row + x / BITS_PER_WORD];
        let bit = 1u64 << (x % BITS_PER_WORD);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Fill all bits with the given value, keeping row padding cleared.
    pub fn fill(&mut self, value: bool) {
        if !value {
            self.words.fill(0);
            return;
        }
        if self.words_per_row == 0 {
            return;
        }
        let tail_bits = self.width - (self.words_per_row - 1) * BITS_PER_WORD;
        let tail_mask = bit_range_mask(0, tail_bits);
        for row in self.words.chunks_exact_mut(self.words_per_row) {
            row.fill(!0u64);
            if let Some(last) = row.last_mut() {
                *last = tail_mask;
            }
        }
    }

    /// Evaluate `f(x, y)` for every pixel and store the result, rows in parallel.
    pub fn par_fill_with<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> bool + Sync,
    {
        if self.words_per_row == 0 {
            return;
        }
        let width = self.width;
        self.words
            .par_chunks_exact_mut(self.words_per_row)
            .enumerate()
            .for_each(|(y, row)| {
                row.fill(0);
                for x in 0..width {
                    if f(x, y) {
                        row[x / BITS_PER_WORD] |= 1u64 << (x % BITS_PER_WORD);
                    }
                }
            });
    }

    /// Storage words of row `y`.
    #[inline]
    pub fn row_words(&self, y: usize) -> &[u64] {
        debug_assert!(y < self.height);
        let start = y * self.words_per_row;
        &self.words[start..start + self.words_per_row]
    }

    /// Count the number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// First set bit in row `y` within columns `x_start..x_end`.
    pub fn first_set_in_row(&self, y: usize, x_start: usize, x_end: usize) -> Option<usize> {
        self.scan_row(y, x_start, x_end, false)
    }

    /// First cleared bit in row `y` within columns `x_start..x_end`.
    pub fn first_unset_in_row(&self, y: usize, x_start: usize, x_end: usize) -> Option<usize> {
        self.scan_row(y, x_start, x_end, true)
    }

    /// Whether any bit in row `y` within columns `x_start..x_end` is set.
    #[inline]
    pub fn any_in_row(&self, y: usize, x_start: usize, x_end: usize) -> bool {
        self.first_set_in_row(y, x_start, x_end).is_some()
    }

    fn scan_row(&self, y: usize, x_start: usize, x_end: usize, invert: bool) -> Option<usize> {
        debug_assert!(x_end <= self.width);
        if x_start >= x_end {
            return None;
        }
        let row = self.row_words(y);
        let first_word = x_start / BITS_PER_WORD;
        let last_word = (x_end - 1) / BITS_PER_WORD;
        for (w, &word) in row
            .iter()
            .enumerate()
            .take(last_word + 1)
            .skip(first_word)
        {
            let lo = if w == first_word {
                x_start % BITS_PER_WORD
            } else {
                0
            };
            let hi = if w == last_word {
                (x_end - 1) % BITS_PER_WORD + 1
            } else {
                BITS_PER_WORD
            };
            let bits = (if invert { !word } else { word }) & bit_range_mask(lo, hi);
            if bits != 0 {
                return Some(w * BITS_PER_WORD + bits.trailing_zeros() as usize);
            }
        }
        None
    }
}
