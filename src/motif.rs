//! Motif occurrence search.
//!
//! Motifs are literal text. Characters that would be pattern syntax elsewhere
//! (`.`, `*`, `[`, ...) are compared like any other symbol.

use crate::iupac_code::IupacCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The stock motifs offered for searching, plus a free-text one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotifPreset {
    StartCodon,
    TataBox,
    Ggc,
    Minus35Box,
    Custom(String),
}

impl MotifPreset {
    pub fn all_stock() -> [MotifPreset; 4] {
        [
            MotifPreset::StartCodon,
            MotifPreset::TataBox,
            MotifPreset::Ggc,
            MotifPreset::Minus35Box,
        ]
    }

    pub fn motif(&self) -> &str {
        match self {
            MotifPreset::StartCodon => "ATG",
            MotifPreset::TataBox => "TATA",
            MotifPreset::Ggc => "GGC",
            MotifPreset::Minus35Box => "TTGACA",
            MotifPreset::Custom(s) => s,
        }
    }
}

impl From<&str> for MotifPreset {
    fn from(s: &str) -> Self {
        let normalized = normalize_motif(s);
        Self::all_stock()
            .into_iter()
            .find(|p| p.motif() == normalized)
            .unwrap_or(MotifPreset::Custom(normalized))
    }
}

impl fmt::Display for MotifPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.motif())
    }
}

/// Motifs are compared against uppercased sequences, so they get the same
/// treatment.
pub fn normalize_motif(motif: &str) -> String {
    motif.trim().to_ascii_uppercase()
}

/// 1-based start positions of every occurrence of `motif`, overlapping ones
/// included. An empty motif, or one longer than the sequence, finds nothing.
pub fn motif_search(sequence: &[u8], motif: &str) -> Vec<usize> {
    let motif = normalize_motif(motif);
    let motif = motif.as_bytes();
    if motif.is_empty() || motif.len() > sequence.len() {
        return vec![];
    }
    sequence
        .windows(motif.len())
        .enumerate()
        .filter(|(_, w)| *w == motif)
        .map(|(pos, _)| pos + 1)
        .collect()
}

/// Like [`motif_search`], but each motif symbol is an IUPAC code matching any
/// of the bases it stands for. Ambiguous sequence symbols never match.
pub fn motif_search_iupac(sequence: &[u8], motif: &str) -> Vec<usize> {
    let codes: Vec<IupacCode> = normalize_motif(motif)
        .bytes()
        .map(IupacCode::from_letter)
        .collect();
    if codes.is_empty() || codes.len() > sequence.len() || codes.iter().any(|c| c.is_empty()) {
        return vec![];
    }
    sequence
        .windows(codes.len())
        .enumerate()
        .filter(|(_, w)| {
            w.iter()
                .zip(codes.iter())
                .all(|(&base, code)| code.matches_base(base))
        })
        .map(|(pos, _)| pos + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"AAA", "AA", vec![1, 2])]
    #[case(b"AAAA", "AA", vec![1, 2, 3])]
    #[case(b"ATGCATGATG", "ATG", vec![1, 5, 8])]
    #[case(b"ATGCATGATG", "atg", vec![1, 5, 8])]
    #[case(b"ACGT", "", vec![])]
    #[case(b"ACGT", "ACGTA", vec![])]
    #[case(b"ACGT", "ACGT", vec![1])]
    #[case(b"TTTT", "G", vec![])]
    fn test_motif_search(#[case] seq: &[u8], #[case] motif: &str, #[case] expected: Vec<usize>) {
        assert_eq!(motif_search(seq, motif), expected);
    }

    #[test]
    fn test_pattern_characters_are_literal() {
        assert!(motif_search(b"ACGT", "A.G").is_empty());
        assert!(motif_search(b"AAAA", "A*").is_empty());
        assert!(motif_search(b"ACGT", "[AC]").is_empty());
        assert_eq!(motif_search(b"AC.GT", "C.G"), vec![2]);
    }

    #[test]
    fn test_motif_search_iupac() {
        assert_eq!(motif_search_iupac(b"TATAAATATTTA", "TATWAA"), vec![1]);
        assert_eq!(motif_search_iupac(b"ACGTACGT", "RY"), vec![1, 3, 5, 7]);
        assert_eq!(motif_search_iupac(b"ANGT", "NN"), vec![3]);
        assert!(motif_search_iupac(b"ACGT", "A-").is_empty());
        assert!(motif_search_iupac(b"ACGT", "").is_empty());
    }

    #[test]
    fn test_presets() {
        assert_eq!(MotifPreset::from("tata"), MotifPreset::TataBox);
        assert_eq!(MotifPreset::from("TTGACA").motif(), "TTGACA");
        assert_eq!(
            MotifPreset::from(" gaattc "),
            MotifPreset::Custom("GAATTC".to_string())
        );
        assert_eq!(MotifPreset::StartCodon.to_string(), "ATG");
    }
}
