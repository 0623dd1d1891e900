//! Result records and parameters exchanged between the analysis engine and
//! whatever renders its output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detail lists (positions, SNPs) are cut off after this many entries.
/// Totals are always reported uncapped next to them.
pub const PREVIEW_CAP: usize = 1000;

/// Shortest stretch of consecutive `N` reported as a gap run.
pub const MIN_N_RUN: usize = 5;

pub const DEFAULT_MOTIF: &str = "ATG";
pub const DEFAULT_WINDOW_SIZE: usize = 500;
pub const DEFAULT_DEFECT_WINDOW_SIZE: usize = 1000;
pub const DEFAULT_Z_THRESHOLD: f64 = 2.5;
pub const DEFAULT_MIN_ORF: usize = 150;
pub const DEFAULT_SIMILARITY_MAX_LEN: usize = 2000;
pub const DEFAULT_SNP_MAX_LEN: usize = 5000;
pub const DEFAULT_TOP_CODONS: usize = 10;

/// Codon -> relative frequency, in codon order.
pub type CodonFrequencyTable = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcWindow {
    /// 1-based, inclusive
    pub start: usize,
    /// 1-based, inclusive
    pub end: usize,
    pub gc_percent: f64,
}

impl GcWindow {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierWindow {
    #[serde(flatten)]
    pub window: GcWindow,
    pub z_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NRun {
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityReport {
    pub ambiguous_positions: Vec<usize>,
    pub ambiguous_total: usize,
    pub iupac_counts: BTreeMap<char, usize>,
    pub n_runs: Vec<NRun>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrfFlag {
    pub frame: u8,
    pub first_stop_nt: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnpRecord {
    pub pos: usize,
    #[serde(rename = "ref")]
    pub reference: char,
    pub alt: char,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnpDiffResult {
    pub checked_bases: usize,
    pub snp_count: usize,
    pub snps_preview: Vec<SnpRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodonShare {
    pub codon: String,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub id: String,
    pub description: Option<String>,
    pub length: usize,
    pub gc_percent: f64,
    pub motif: String,
    pub motif_positions: Vec<usize>,
    pub motif_count: usize,
    pub top_codons: Vec<CodonShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub gc_difference: f64,
    pub motif_count_difference: usize,
    pub similarity_percent: f64,
    /// Number of leading bases each sequence contributed to the similarity score
    pub similarity_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectScan {
    pub seq_id: String,
    pub ambiguity: AmbiguityReport,
    pub gc_windows: Vec<GcWindow>,
    pub gc_outliers: Vec<OutlierWindow>,
    pub premature_stops: Vec<OrfFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snp_diff: Option<SnpDiffResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub first: SequenceSummary,
    pub second: SequenceSummary,
    pub comparison: ComparisonSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defects: Vec<DefectScan>,
    pub parameters: AnalysisParameters,
}

/// Tunable knobs of a comparison session. Missing fields in a JSON document
/// fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParameters {
    pub motif: String,
    pub window_size: usize,
    pub defect_window_size: usize,
    pub z_threshold: f64,
    pub min_orf: usize,
    pub similarity_max_len: usize,
    pub snp_max_len: usize,
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            motif: DEFAULT_MOTIF.to_string(),
            window_size: DEFAULT_WINDOW_SIZE,
            defect_window_size: DEFAULT_DEFECT_WINDOW_SIZE,
            z_threshold: DEFAULT_Z_THRESHOLD,
            min_orf: DEFAULT_MIN_ORF,
            similarity_max_len: DEFAULT_SIMILARITY_MAX_LEN,
            snp_max_len: DEFAULT_SNP_MAX_LEN,
        }
    }
}

impl AnalysisParameters {
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 {
            return Err("window_size must be >= 1".to_string());
        }
        if self.defect_window_size == 0 {
            return Err("defect_window_size must be >= 1".to_string());
        }
        if !self.z_threshold.is_finite() || self.z_threshold < 0.0 {
            return Err(format!(
                "z_threshold must be a finite, non-negative number (got {})",
                self.z_threshold
            ));
        }
        if self.similarity_max_len == 0 {
            return Err("similarity_max_len must be >= 1".to_string());
        }
        if self.snp_max_len == 0 {
            return Err("snp_max_len must be >= 1".to_string());
        }
        Ok(())
    }
}
