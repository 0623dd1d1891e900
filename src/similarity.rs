//! Heuristic pairwise similarity from a global alignment score.
//!
//! Scoring: match +1, mismatch 0, gap open 0, gap extension 0. Symbols are
//! compared literally, so `N` aligned with `N` counts as a match. With these
//! weights the global score is the length of the longest common subsequence,
//! and the similarity lies in [0, 100]. It is not a calibrated identity.

use crate::error::EngineError;
use bio::alignment::pairwise::Aligner;
use log::debug;

pub const MATCH_SCORE: i32 = 1;
pub const MISMATCH_SCORE: i32 = 0;
pub const GAP_OPEN: i32 = 0;
pub const GAP_EXTEND: i32 = 0;

/// Global alignment score of `x` against `y`. The cost is O(|x|·|y|) in time
/// and memory; callers truncate first.
pub fn global_alignment_score(x: &[u8], y: &[u8]) -> i32 {
    if x.is_empty() || y.is_empty() {
        // Only gaps, which are free
        return 0;
    }
    let score = |a: u8, b: u8| {
        if a == b {
            MATCH_SCORE
        } else {
            MISMATCH_SCORE
        }
    };
    let mut aligner = Aligner::with_capacity(x.len(), y.len(), GAP_OPEN, GAP_EXTEND, &score);
    aligner.global(x, y).score
}

/// Similarity percentage of the first `max_len` symbols of both sequences:
/// `score / max(len1, len2) * 100`.
pub fn compare_sequences(seq1: &[u8], seq2: &[u8], max_len: usize) -> Result<f64, EngineError> {
    let x = &seq1[..seq1.len().min(max_len)];
    let y = &seq2[..seq2.len().min(max_len)];
    let longest = x.len().max(y.len());
    if longest == 0 {
        return Err(EngineError::empty_sequence("Similarity"));
    }
    let score = global_alignment_score(x, y);
    debug!(
        "Global alignment of {} x {} bases scored {score}",
        x.len(),
        y.len()
    );
    Ok(score as f64 / longest as f64 * 100.0)
}
