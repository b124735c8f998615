//! Citekey disambiguation.
//!
//! When a desired citekey is already taken, a letter suffix is appended.
//! Suffixes come from an unbounded base-26 counter whose digits are the
//! lowercase letters. The counter is little-endian and is rendered least
//! significant digit first:
//!
//! ```text
//! "", "a", "b", ..., "z", "aa", "ba", ..., "za", "ab", "bb", ..., "zz", "aaa", ...
//! ```

/// Digits of the suffix counter.
pub const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Infinite sequence of citekey suffixes, starting with the empty suffix.
#[derive(Debug, Clone, Default)]
pub struct SuffixCounter {
    /// Indices into [`ALPHABET`], least significant first.
    digits: Vec<usize>,
}

impl SuffixCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current suffix and advance the counter.
    pub fn next_suffix(&mut self) -> String {
        let suffix = self.render();
        self.increment();
        suffix
    }

    fn render(&self) -> String {
        self.digits.iter().map(|&d| ALPHABET[d] as char).collect()
    }

    fn increment(&mut self) {
        for digit in &mut self.digits {
            if *digit + 1 == ALPHABET.len() {
                *digit = 0;
            } else {
                *digit += 1;
                return;
            }
        }
        self.digits.push(0);
    }
}

impl Iterator for SuffixCounter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_suffix())
    }
}

/// Return `base` if unused, else `base` followed by the first suffix for
/// which `is_used` returns false.
///
/// Terminates for any finite used-set since the counter never repeats.
pub fn next_free(base: &str, is_used: impl Fn(&str) -> bool) -> String {
    let mut counter = SuffixCounter::new();
    loop {
        let candidate = format!("{base}{}", counter.next_suffix());
        if !is_used(&candidate) {
            return candidate;
        }
    }
}
