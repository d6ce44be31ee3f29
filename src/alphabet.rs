/* ------------------------------------------------------------------ */
/* Fixed character alphabet, accent folding, one-hot encoding         */
/* ------------------------------------------------------------------ */
//
// Names are restricted to ASCII letters plus a little punctuation.
// normalize() folds accented Latin letters to their base form (NFD
// decomposition, then dropping combining marks) and discards anything
// that still falls outside the alphabet. Non-Latin scripts collapse to
// the empty string.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const ALL_LETTERS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ .,;'";

// ASCII only, so byte length equals character count.
pub const N_LETTERS: usize = ALL_LETTERS.len();

/// Position of a character in the fixed alphabet.
pub fn letter_index(c: char) -> Option<usize> {
    ALL_LETTERS.chars().position(|l| l == c)
}

/// Fold a raw UTF-8 string down to the fixed alphabet.
/// Idempotent, and the identity on already-clean input.
pub fn normalize(s: &str) -> String {
    s.nfd()
        .filter(|&c| !is_combining_mark(c))
        .filter(|&c| ALL_LETTERS.contains(c))
        .collect()
}

/// One-hot vector of length N_LETTERS.
///
/// Callers must hand in alphabet members only; normalize() upstream
/// guarantees that. An outsider reaching this point is a contract
/// violation and panics rather than producing a wrong index.
pub fn encode_char(c: char) -> Vec<f32> {
    let idx = match letter_index(c) {
        Some(i) => i,
        None => panic!("character {:?} is outside the fixed alphabet", c),
    };
    let mut v = vec![0.0; N_LETTERS];
    v[idx] = 1.0;
    v
}

/// One one-hot vector per character, in name order.
pub fn encode_name(name: &str) -> Vec<Vec<f32>> {
    name.chars().map(encode_char).collect()
}
