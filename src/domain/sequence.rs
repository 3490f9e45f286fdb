// ============================================================
// Layer 3 — Sequence Utilities
// ============================================================
// Stateless helpers over nucleotide strings:
//   - sanitize:           uppercase, anything outside ATCGN → N
//   - gc_content:         (#G + #C) / (#bases that are not N)
//   - reverse_complement: A↔T, G↔C, N↔N, then reverse
//   - composition:        per-base counts plus GC/AT percentages
//
// All functions are pure and allocation-light so they can be
// called from any thread without coordination.

use serde::{Deserialize, Serialize};

/// The nucleotide alphabet every sequence is reduced to.
pub const VALID_BASES: [char; 5] = ['A', 'T', 'C', 'G', 'N'];

/// Uppercase the sequence and map every character outside
/// {A,T,C,G,N} to `N`. Output length always equals input length
/// in chars.
pub fn sanitize(sequence: &str) -> String {
    sequence
        .chars()
        .map(|c| {
            let c = c.to_ascii_uppercase();
            if VALID_BASES.contains(&c) { c } else { 'N' }
        })
        .collect()
}

/// Fraction of G/C among the non-ambiguous bases.
///
/// `N` is excluded from the denominator; an empty or all-`N`
/// sequence yields 0.0.
pub fn gc_content(sequence: &str) -> f64 {
    let mut gc    = 0usize;
    let mut total = 0usize;
    for c in sequence.chars().map(|c| c.to_ascii_uppercase()) {
        match c {
            'N'       => {}
            'G' | 'C' => { gc += 1; total += 1; }
            _         => total += 1,
        }
    }
    if total == 0 { 0.0 } else { gc as f64 / total as f64 }
}

/// Watson-Crick complement of a single base. Anything that is not
/// a recognised base complements to `N`.
pub fn complement(base: char) -> char {
    match base.to_ascii_uppercase() {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        'C' => 'G',
        _   => 'N',
    }
}

/// Reverse complement. An involution on strings over {A,T,G,C,N}.
pub fn reverse_complement(sequence: &str) -> String {
    sequence.chars().rev().map(complement).collect()
}

/// Base counts and GC statistics for a cleaned sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub length:      usize,
    pub a:           usize,
    pub t:           usize,
    pub g:           usize,
    pub c:           usize,
    pub n:           usize,
    /// Same definition as [`gc_content`], in [0, 1]
    pub gc_content:  f64,
    /// gc_content × 100, rounded to two decimals
    pub gc_percent:  f64,
    /// 100 − gc_percent, rounded to two decimals (0 when nothing is countable)
    pub at_percent:  f64,
}

pub fn composition(sequence: &str) -> Composition {
    let (mut a, mut t, mut g, mut c, mut n) = (0, 0, 0, 0, 0);
    let mut length = 0usize;
    for base in sequence.chars().map(|b| b.to_ascii_uppercase()) {
        length += 1;
        match base {
            'A' => a += 1,
            'T' => t += 1,
            'G' => g += 1,
            'C' => c += 1,
            _   => n += 1,
        }
    }

    let countable  = a + t + g + c;
    let gc_content = if countable == 0 { 0.0 } else { (g + c) as f64 / countable as f64 };
    let gc_percent = round2(gc_content * 100.0);
    let at_percent = if countable == 0 { 0.0 } else { round2(100.0 - gc_percent) };

    Composition { length, a, t, g, c, n, gc_content, gc_percent, at_percent }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
