use crate::{error::EngineError, iupac_code::IupacCode};
use dna_compare_protocol::{CodonFrequencyTable, CodonShare};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Relative frequency of every unambiguous codon, reading non-overlapping
/// triplets from offset 0. Codons containing anything but A/C/G/T are skipped
/// and do not count towards the total; a trailing partial codon is ignored.
pub fn codon_frequency(sequence: &[u8]) -> Result<CodonFrequencyTable, EngineError> {
    if sequence.is_empty() {
        return Err(EngineError::empty_sequence("Codon frequency"));
    }
    let mut counts: BTreeMap<[u8; 3], usize> = BTreeMap::new();
    for codon in sequence.chunks_exact(3) {
        if codon.iter().all(|&b| IupacCode::is_unambiguous_base(b)) {
            *counts.entry([codon[0], codon[1], codon[2]]).or_default() += 1;
        }
    }
    let total: usize = counts.values().sum();
    Ok(counts
        .into_iter()
        .map(|(codon, n)| {
            (
                String::from_utf8_lossy(&codon).to_string(),
                n as f64 / total as f64,
            )
        })
        .collect())
}

/// The `n` most frequent codons; equal frequencies keep codon order.
pub fn top_codons(table: &CodonFrequencyTable, n: usize) -> Vec<CodonShare> {
    table
        .iter()
        .sorted_by(|a, b| b.1.total_cmp(a.1))
        .take(n)
        .map(|(codon, frequency)| CodonShare {
            codon: codon.to_owned(),
            frequency: *frequency,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_codon_frequency() {
        let table = codon_frequency(b"ATGATGTAAGC").unwrap();
        assert_eq!(table.len(), 2);
        assert!((table["ATG"] - 2.0 / 3.0).abs() < 1e-12);
        assert!((table["TAA"] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ambiguous_codons_are_skipped() {
        let table = codon_frequency(b"ATGNTGATGCCR").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["ATG"], 1.0);
    }

    #[test]
    fn test_frequencies_sum_to_one() {
        let seq = "ATGGCGTTAACCGGTANNACGTTGCA".repeat(11);
        let table = codon_frequency(seq.as_bytes()).unwrap();
        let sum: f64 = table.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(table.keys().all(|c| c.len() == 3));
    }

    #[test]
    fn test_no_unambiguous_codon() {
        assert!(codon_frequency(b"NNNRYK").unwrap().is_empty());
        assert!(codon_frequency(b"AC").unwrap().is_empty());
    }

    #[test]
    fn test_empty_sequence() {
        let err = codon_frequency(b"").unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptySequence);
    }

    #[test]
    fn test_top_codons() {
        let table = codon_frequency(b"CCCAAAGGGAAAGGGTTT").unwrap();
        let top = top_codons(&table, 3);
        let codons: Vec<_> = top.iter().map(|c| c.codon.as_str()).collect();
        assert_eq!(codons, vec!["AAA", "GGG", "CCC"]);
        assert!((top[0].frequency - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(top_codons(&table, 100).len(), 4);
    }
}
