use crate::iupac_code::IupacCode;
use dna_compare_protocol::{AmbiguityReport, MIN_N_RUN, NRun, PREVIEW_CAP};
use std::collections::BTreeMap;

/// Maximal runs of at least `min_len` consecutive `symbol`, leftmost first.
pub fn symbol_runs(sequence: &[u8], symbol: u8, min_len: usize) -> Vec<NRun> {
    let mut ret = vec![];
    let mut run_start: Option<usize> = None;
    // One position past the end closes a trailing run
    for pos in 0..=sequence.len() {
        let in_run = sequence.get(pos) == Some(&symbol);
        match (in_run, run_start) {
            (true, None) => run_start = Some(pos),
            (false, Some(start)) => {
                let length = pos - start;
                if length >= min_len {
                    ret.push(NRun {
                        start: start + 1,
                        end: pos,
                        length,
                    });
                }
                run_start = None;
            }
            _ => {}
        }
    }
    ret
}

/// Positions and counts of every symbol other than A/C/G/T, plus runs of
/// at least five `N`. Symbols are single bytes; FASTA import only admits
/// ASCII.
pub fn find_ambiguous_bases(sequence: &[u8]) -> AmbiguityReport {
    let mut ambiguous_positions = vec![];
    let mut ambiguous_total = 0;
    let mut iupac_counts: BTreeMap<char, usize> = BTreeMap::new();
    for (pos, &base) in sequence.iter().enumerate() {
        if IupacCode::is_unambiguous_base(base) {
            continue;
        }
        ambiguous_total += 1;
        if ambiguous_positions.len() < PREVIEW_CAP {
            ambiguous_positions.push(pos + 1);
        }
        *iupac_counts.entry(base as char).or_default() += 1;
    }
    AmbiguityReport {
        ambiguous_positions,
        ambiguous_total,
        iupac_counts,
        n_runs: symbol_runs(sequence, b'N', MIN_N_RUN),
    }
}
