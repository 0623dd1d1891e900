pub mod about;
pub mod ambiguity;
pub mod codon_usage;
pub mod dna_sequence;
pub mod engine;
pub mod error;
pub mod gc_contents;
pub mod iupac_code;
pub mod motif;
pub mod open_reading_frame;
pub mod similarity;
pub mod snp;
pub mod translation;

pub use dna_compare_protocol as protocol;
