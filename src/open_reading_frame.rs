use crate::translation::{GeneticCode, STOP};
use dna_compare_protocol::OrfFlag;

const FRAMES: [u8; 3] = [0, 1, 2];

/// Position of the first stop codon of a forward reading frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameStop {
    frame: u8,
    /// 0-based codon index of the stop within the frame
    codon_index: usize,
}

impl FrameStop {
    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Nucleotide offset of the stop from the frame start
    pub fn frame_offset_nt(&self) -> usize {
        self.codon_index * 3
    }

    /// 1-based nucleotide position of the stop codon's first base
    pub fn first_stop_nt(&self) -> usize {
        self.codon_index * 3 + self.frame as usize + 1
    }

    /// First stop in the given frame, scanning the whole translation
    pub fn find(sequence: &[u8], frame: u8) -> Option<Self> {
        let shifted = sequence.get(frame as usize..)?;
        GeneticCode::standard()
            .translate(shifted)
            .iter()
            .position(|&aa| aa == STOP)
            .map(|codon_index| FrameStop { frame, codon_index })
    }
}

/// Flags each forward frame whose first stop codon comes before `min_orf`
/// nucleotides into the frame, i.e. frames that cannot hold an ORF of that
/// length from their start. Frames without any stop are not flagged.
pub fn premature_stop_flags(sequence: &[u8], min_orf: usize) -> Vec<OrfFlag> {
    FRAMES
        .iter()
        .filter_map(|&frame| FrameStop::find(sequence, frame))
        .filter(|stop| stop.frame_offset_nt() < min_orf)
        .map(|stop| OrfFlag {
            frame: stop.frame(),
            first_stop_nt: stop.first_stop_nt(),
        })
        .collect()
}
