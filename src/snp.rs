use crate::iupac_code::IupacCode;
use dna_compare_protocol::{PREVIEW_CAP, SnpDiffResult, SnpRecord};

/// Position-by-position substitutions of `sequence` against `reference`
/// over the first `min(len, ref len, max_len)` bases. No indel handling.
///
/// Only positions where both sides carry a plain A/C/G/T that differ count
/// as SNPs; positions with an ambiguous symbol on either side are skipped
/// but still counted in `checked_bases`, which is the number of positions
/// visited.
pub fn simple_snp_diff(sequence: &[u8], reference: &[u8], max_len: usize) -> SnpDiffResult {
    let checked_bases = sequence.len().min(reference.len()).min(max_len);
    let mut snp_count = 0;
    let mut snps_preview = vec![];
    for (pos, (&alt, &ref_base)) in sequence
        .iter()
        .zip(reference.iter())
        .take(checked_bases)
        .enumerate()
    {
        if alt == ref_base || !is_comparable(alt) || !is_comparable(ref_base) {
            continue;
        }
        snp_count += 1;
        if snps_preview.len() < PREVIEW_CAP {
            snps_preview.push(SnpRecord {
                pos: pos + 1,
                reference: ref_base as char,
                alt: alt as char,
            });
        }
    }
    SnpDiffResult {
        checked_bases,
        snp_count,
        snps_preview,
    }
}

#[inline(always)]
fn is_comparable(base: u8) -> bool {
    IupacCode::is_valid_letter(base) && IupacCode::is_unambiguous_base(base)
}
