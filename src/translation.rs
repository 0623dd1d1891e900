//! Nucleotide to amino acid translation with the standard genetic code
//! (NCBI table 1).

use crate::iupac_code::IupacCode;
use itertools::iproduct;
use lazy_static::lazy_static;
use std::collections::HashMap;

pub const STOP: u8 = b'*';
pub const UNKNOWN: u8 = b'X';

/// NCBI order, bases T, C, A, G at each codon position
const STANDARD_NCBIEAA: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

const IUPAC_LETTERS: &[u8; 16] = b"ACGTUWSMKRYBDHVN";

lazy_static! {
    /// Every codon spelled with IUPAC letters, ambiguous ones resolved
    static ref STANDARD_CODE: GeneticCode = GeneticCode::new(1, "Standard", STANDARD_NCBIEAA);
}

#[derive(Debug, Clone)]
pub struct GeneticCode {
    id: u8,
    name: String,
    codons: HashMap<[u8; 3], u8>,
}

#[inline(always)]
fn ncbi_index(base: u8) -> usize {
    match base {
        b'T' => 0,
        b'C' => 1,
        b'A' => 2,
        _ => 3,
    }
}

impl GeneticCode {
    fn new(id: u8, name: &str, ncbieaa: &[u8; 64]) -> Self {
        let unambiguous = |codon: [u8; 3]| {
            ncbieaa[ncbi_index(codon[0]) * 16 + ncbi_index(codon[1]) * 4 + ncbi_index(codon[2])]
        };

        let mut codons = HashMap::with_capacity(IUPAC_LETTERS.len().pow(3));
        for (&b1, &b2, &b3) in iproduct!(IUPAC_LETTERS, IUPAC_LETTERS, IUPAC_LETTERS) {
            let e1 = IupacCode::from_letter(b1).to_vec();
            let e2 = IupacCode::from_letter(b2).to_vec();
            let e3 = IupacCode::from_letter(b3).to_vec();
            let mut residues = iproduct!(e1.iter(), e2.iter(), e3.iter())
                .map(|(&x, &y, &z)| unambiguous([x, y, z]));
            let first = residues.next().unwrap_or(UNKNOWN);
            let aa = if residues.all(|aa| aa == first) {
                first
            } else {
                UNKNOWN
            };
            codons.insert([b1, b2, b3], aa);
        }

        Self {
            id,
            name: name.to_string(),
            codons,
        }
    }

    pub fn standard() -> &'static GeneticCode {
        &STANDARD_CODE
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Residue for one codon. Ambiguous codons give a residue only when every
    /// base combination agrees on it (`TAR` is a stop); otherwise, and for
    /// non-IUPAC symbols, `X`.
    #[inline(always)]
    pub fn translate_codon(&self, codon: &[u8]) -> u8 {
        match codon {
            [a, b, c] => *self
                .codons
                .get(&[a.to_ascii_uppercase(), b.to_ascii_uppercase(), c.to_ascii_uppercase()])
                .unwrap_or(&UNKNOWN),
            _ => UNKNOWN,
        }
    }

    #[inline(always)]
    pub fn is_stop_codon(&self, codon: &[u8]) -> bool {
        self.translate_codon(codon) == STOP
    }

    /// Translates whole codons from the start of `sequence`. Stops are
    /// emitted as `*` and translation carries on past them; a trailing
    /// partial codon is dropped.
    pub fn translate(&self, sequence: &[u8]) -> Vec<u8> {
        sequence
            .chunks_exact(3)
            .map(|codon| self.translate_codon(codon))
            .collect()
    }
}

pub fn translate(sequence: &[u8]) -> String {
    String::from_utf8_lossy(&GeneticCode::standard().translate(sequence)).to_string()
}
