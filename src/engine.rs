use crate::{
    ambiguity::find_ambiguous_bases,
    codon_usage::{codon_frequency, top_codons},
    dna_sequence::DNAsequence,
    error::{EngineError, ErrorCode},
    gc_contents::{gc_content, gc_outliers, sliding_gc},
    motif::{motif_search, normalize_motif},
    open_reading_frame::premature_stop_flags,
    similarity::compare_sequences,
    snp::simple_snp_diff,
};
use dna_compare_protocol::{
    AmbiguityReport, AnalysisParameters, CodonFrequencyTable, ComparisonReport,
    ComparisonSummary, DEFAULT_TOP_CODONS, DefectScan, GcWindow, OrfFlag, OutlierWindow,
    SequenceSummary, SnpDiffResult,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type SeqId = String;
pub type OpId = String;
pub type RunId = String;

/// Sequences loaded into a session, plus the parameters operations fall
/// back to. Lives in memory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub sequences: HashMap<SeqId, DNAsequence>,
    #[serde(default)]
    pub parameters: AnalysisParameters,
}

/// One engine request. Optional fields fall back to the session parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    LoadFasta {
        text: String,
        as_id: Option<SeqId>,
    },
    GcContent {
        input: SeqId,
    },
    CodonFrequency {
        input: SeqId,
    },
    SlidingGc {
        input: SeqId,
        window_size: Option<usize>,
    },
    GcOutliers {
        input: SeqId,
        window_size: Option<usize>,
        z_threshold: Option<f64>,
    },
    MotifSearch {
        input: SeqId,
        motif: Option<String>,
    },
    Similarity {
        first: SeqId,
        second: SeqId,
        max_len: Option<usize>,
    },
    AmbiguityScan {
        input: SeqId,
    },
    PrematureStops {
        input: SeqId,
        min_orf: Option<usize>,
    },
    SnpDiff {
        input: SeqId,
        reference: SeqId,
        max_len: Option<usize>,
    },
    DefectScan {
        input: SeqId,
        reference: Option<SeqId>,
    },
    Compare {
        first: SeqId,
        second: SeqId,
        reference: Option<SeqId>,
        #[serde(default)]
        with_defects: bool,
    },
    SetParameter {
        name: String,
        value: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub run_id: RunId,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisOutput {
    None,
    GcContent {
        seq_id: SeqId,
        gc_percent: f64,
    },
    CodonFrequency {
        seq_id: SeqId,
        frequencies: CodonFrequencyTable,
    },
    GcWindows {
        seq_id: SeqId,
        window_size: usize,
        windows: Vec<GcWindow>,
    },
    GcOutliers {
        seq_id: SeqId,
        window_size: usize,
        z_threshold: f64,
        outliers: Vec<OutlierWindow>,
    },
    MotifPositions {
        seq_id: SeqId,
        motif: String,
        count: usize,
        positions: Vec<usize>,
    },
    Similarity {
        first: SeqId,
        second: SeqId,
        max_len: usize,
        similarity_percent: f64,
    },
    Ambiguity {
        seq_id: SeqId,
        report: AmbiguityReport,
    },
    PrematureStops {
        seq_id: SeqId,
        min_orf: usize,
        flags: Vec<OrfFlag>,
    },
    SnpDiff {
        seq_id: SeqId,
        reference: SeqId,
        result: SnpDiffResult,
    },
    DefectScan(DefectScan),
    Comparison(Box<ComparisonReport>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: OpId,
    pub loaded_seq_ids: Vec<SeqId>,
    pub output: AnalysisOutput,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub run_id: RunId,
    pub op: Operation,
    pub result: OpResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_operations: Vec<String>,
    pub default_parameters: AnalysisParameters,
    pub deterministic_operation_log: bool,
}

pub trait Engine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError>;
    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError>;
    fn snapshot(&self) -> &SessionState;
}

/// Per-sequence composition block of a comparison report.
pub fn summarize_sequence(
    dna: &DNAsequence,
    params: &AnalysisParameters,
) -> Result<SequenceSummary, EngineError> {
    let motif = normalize_motif(&params.motif);
    let motif_positions = motif_search(dna.forward(), &motif);
    let codons = codon_frequency(dna.forward())?;
    Ok(SequenceSummary {
        id: dna.name().to_string(),
        description: dna.description().map(|d| d.to_string()),
        length: dna.len(),
        gc_percent: gc_content(dna.forward())?,
        motif,
        motif_count: motif_positions.len(),
        motif_positions,
        top_codons: top_codons(&codons, DEFAULT_TOP_CODONS),
    })
}

/// Quality screen of one sequence; the SNP diff only runs with a reference.
pub fn defect_scan(
    dna: &DNAsequence,
    reference: Option<&DNAsequence>,
    params: &AnalysisParameters,
) -> Result<DefectScan, EngineError> {
    let gc_windows: Vec<GcWindow> =
        sliding_gc(dna.forward(), params.defect_window_size)?.collect();
    let scan = DefectScan {
        seq_id: dna.name().to_string(),
        ambiguity: find_ambiguous_bases(dna.forward()),
        gc_outliers: gc_outliers(&gc_windows, params.z_threshold),
        gc_windows,
        premature_stops: premature_stop_flags(dna.forward(), params.min_orf),
        snp_diff: reference
            .map(|r| simple_snp_diff(dna.forward(), r.forward(), params.snp_max_len)),
    };
    debug!(
        "Defect scan of '{}': {} ambiguous, {} GC outlier window(s), {} premature stop(s)",
        scan.seq_id,
        scan.ambiguity.ambiguous_total,
        scan.gc_outliers.len(),
        scan.premature_stops.len()
    );
    Ok(scan)
}

/// Full two-sequence report. The two sequences are analyzed independently,
/// on separate rayon tasks.
pub fn compare_pair(
    first: &DNAsequence,
    second: &DNAsequence,
    reference: Option<&DNAsequence>,
    with_defects: bool,
    params: &AnalysisParameters,
) -> Result<ComparisonReport, EngineError> {
    params
        .validate()
        .map_err(|e| EngineError::new(ErrorCode::InvalidInput, e))?;
    let analyze = |dna: &DNAsequence| -> Result<(SequenceSummary, Option<DefectScan>), EngineError> {
        let summary = summarize_sequence(dna, params)?;
        let defects = if with_defects {
            Some(defect_scan(dna, reference, params)?)
        } else {
            None
        };
        Ok((summary, defects))
    };
    let ((first_res, second_res), similarity) = rayon::join(
        || rayon::join(|| analyze(first), || analyze(second)),
        || compare_sequences(first.forward(), second.forward(), params.similarity_max_len),
    );
    let (first_summary, first_defects) = first_res?;
    let (second_summary, second_defects) = second_res?;
    let similarity_percent = similarity?;

    let comparison = ComparisonSummary {
        gc_difference: (first_summary.gc_percent - second_summary.gc_percent).abs(),
        motif_count_difference: first_summary.motif_count.abs_diff(second_summary.motif_count),
        similarity_percent,
        similarity_window: first
            .len()
            .max(second.len())
            .min(params.similarity_max_len),
    };
    info!(
        "Compared '{}' ({} bp) with '{}' ({} bp): {:.2}% similar",
        first.name(),
        first.len(),
        second.name(),
        second.len(),
        similarity_percent
    );

    Ok(ComparisonReport {
        first: first_summary,
        second: second_summary,
        comparison,
        reference_id: reference.map(|r| r.name().to_string()),
        defects: first_defects.into_iter().chain(second_defects).collect(),
        parameters: params.clone(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct CompareEngine {
    state: SessionState,
    journal: Vec<OperationRecord>,
    op_counter: u64,
}

impl CompareEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: AnalysisParameters) -> Result<Self, EngineError> {
        parameters
            .validate()
            .map_err(|e| EngineError::new(ErrorCode::InvalidInput, e))?;
        Ok(Self {
            state: SessionState {
                parameters,
                ..SessionState::default()
            },
            ..Self::default()
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn parameters(&self) -> &AnalysisParameters {
        &self.state.parameters
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: "v1".to_string(),
            supported_operations: vec![
                "LoadFasta".to_string(),
                "GcContent".to_string(),
                "CodonFrequency".to_string(),
                "SlidingGc".to_string(),
                "GcOutliers".to_string(),
                "MotifSearch".to_string(),
                "Similarity".to_string(),
                "AmbiguityScan".to_string(),
                "PrematureStops".to_string(),
                "SnpDiff".to_string(),
                "DefectScan".to_string(),
                "Compare".to_string(),
                "SetParameter".to_string(),
            ],
            default_parameters: AnalysisParameters::default(),
            deterministic_operation_log: true,
        }
    }

    pub fn operation_log(&self) -> &[OperationRecord] {
        &self.journal
    }

    /// Adds a parsed sequence under `as_id`, or its own name, made unique.
    pub fn add_sequence(&mut self, dna: DNAsequence, as_id: Option<SeqId>) -> SeqId {
        let base = as_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| dna.name().to_string());
        let base = if base.is_empty() {
            "sequence".to_string()
        } else {
            base
        };
        let seq_id = self.unique_seq_id(&base);
        if seq_id != base {
            warn!("Sequence id '{base}' already taken, storing as '{seq_id}'");
        }
        self.state.sequences.insert(seq_id.clone(), dna);
        seq_id
    }

    pub fn sequence(&self, seq_id: &str) -> Result<&DNAsequence, EngineError> {
        self.state.sequences.get(seq_id).ok_or_else(|| {
            EngineError::new(ErrorCode::NotFound, format!("Sequence '{seq_id}' not found"))
        })
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        format!("op-{}", self.op_counter)
    }

    fn unique_seq_id(&self, base: &str) -> SeqId {
        if !self.state.sequences.contains_key(base) {
            return base.to_string();
        }
        let mut i = 2usize;
        loop {
            let candidate = format!("{base}_{i}");
            if !self.state.sequences.contains_key(&candidate) {
                return candidate;
            }
            i += 1;
        }
    }

    fn set_parameter(&mut self, name: &str, value: serde_json::Value) -> Result<(), EngineError> {
        let mut doc = serde_json::to_value(&self.state.parameters)?;
        let slot = doc
            .as_object_mut()
            .and_then(|fields| fields.get_mut(name))
            .ok_or_else(|| {
                EngineError::new(ErrorCode::Unsupported, format!("Unknown parameter '{name}'"))
            })?;
        *slot = value;
        let parameters: AnalysisParameters = serde_json::from_value(doc).map_err(|e| {
            EngineError::new(
                ErrorCode::InvalidInput,
                format!("Invalid value for parameter '{name}': {e}"),
            )
        })?;
        parameters
            .validate()
            .map_err(|e| EngineError::new(ErrorCode::InvalidInput, e))?;
        self.state.parameters = parameters;
        Ok(())
    }

    fn apply_internal(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let mut result = OpResult {
            op_id: self.next_op_id(),
            loaded_seq_ids: vec![],
            output: AnalysisOutput::None,
            warnings: vec![],
            messages: vec![],
        };
        let params = self.state.parameters.clone();

        let output = match op {
            Operation::LoadFasta { text, as_id } => {
                let dna = DNAsequence::from_fasta_text(&text)?;
                if dna.is_empty() {
                    result
                        .warnings
                        .push(format!("Record '{}' has no sequence", dna.name()));
                }
                let length = dna.len();
                let seq_id = self.add_sequence(dna, as_id);
                result
                    .messages
                    .push(format!("Loaded '{seq_id}' ({length} bp)"));
                result.loaded_seq_ids.push(seq_id);
                AnalysisOutput::None
            }
            Operation::GcContent { input } => {
                let dna = self.sequence(&input)?;
                AnalysisOutput::GcContent {
                    gc_percent: gc_content(dna.forward())?,
                    seq_id: input,
                }
            }
            Operation::CodonFrequency { input } => {
                let dna = self.sequence(&input)?;
                let frequencies = codon_frequency(dna.forward())?;
                if frequencies.is_empty() {
                    result
                        .warnings
                        .push(format!("'{input}' has no unambiguous codon"));
                }
                AnalysisOutput::CodonFrequency {
                    seq_id: input,
                    frequencies,
                }
            }
            Operation::SlidingGc { input, window_size } => {
                let window_size = window_size.unwrap_or(params.window_size);
                let dna = self.sequence(&input)?;
                let windows = sliding_gc(dna.forward(), window_size)?.collect();
                AnalysisOutput::GcWindows {
                    seq_id: input,
                    window_size,
                    windows,
                }
            }
            Operation::GcOutliers {
                input,
                window_size,
                z_threshold,
            } => {
                let window_size = window_size.unwrap_or(params.defect_window_size);
                let z_threshold = z_threshold.unwrap_or(params.z_threshold);
                let dna = self.sequence(&input)?;
                let windows: Vec<GcWindow> = sliding_gc(dna.forward(), window_size)?.collect();
                if windows.len() < 3 {
                    result.warnings.push(format!(
                        "'{input}' spans {} window(s) of {window_size} bp; at least 3 are needed for outliers",
                        windows.len()
                    ));
                }
                AnalysisOutput::GcOutliers {
                    outliers: gc_outliers(&windows, z_threshold),
                    seq_id: input,
                    window_size,
                    z_threshold,
                }
            }
            Operation::MotifSearch { input, motif } => {
                let motif = normalize_motif(&motif.unwrap_or(params.motif));
                let dna = self.sequence(&input)?;
                let positions = motif_search(dna.forward(), &motif);
                AnalysisOutput::MotifPositions {
                    seq_id: input,
                    motif,
                    count: positions.len(),
                    positions,
                }
            }
            Operation::Similarity {
                first,
                second,
                max_len,
            } => {
                let max_len = max_len.unwrap_or(params.similarity_max_len);
                let a = self.sequence(&first)?;
                let b = self.sequence(&second)?;
                if a.len().max(b.len()) > max_len {
                    result.warnings.push(format!(
                        "Similarity is based on the first {max_len} bases only"
                    ));
                }
                AnalysisOutput::Similarity {
                    similarity_percent: compare_sequences(a.forward(), b.forward(), max_len)?,
                    first,
                    second,
                    max_len,
                }
            }
            Operation::AmbiguityScan { input } => {
                let dna = self.sequence(&input)?;
                AnalysisOutput::Ambiguity {
                    report: find_ambiguous_bases(dna.forward()),
                    seq_id: input,
                }
            }
            Operation::PrematureStops { input, min_orf } => {
                let min_orf = min_orf.unwrap_or(params.min_orf);
                let dna = self.sequence(&input)?;
                AnalysisOutput::PrematureStops {
                    flags: premature_stop_flags(dna.forward(), min_orf),
                    seq_id: input,
                    min_orf,
                }
            }
            Operation::SnpDiff {
                input,
                reference,
                max_len,
            } => {
                let max_len = max_len.unwrap_or(params.snp_max_len);
                let dna = self.sequence(&input)?;
                let ref_dna = self.sequence(&reference)?;
                if dna.len() != ref_dna.len() {
                    result.warnings.push(format!(
                        "'{input}' ({} bp) and reference '{reference}' ({} bp) differ in length; positions are compared without alignment",
                        dna.len(),
                        ref_dna.len()
                    ));
                }
                AnalysisOutput::SnpDiff {
                    result: simple_snp_diff(dna.forward(), ref_dna.forward(), max_len),
                    seq_id: input,
                    reference,
                }
            }
            Operation::DefectScan { input, reference } => {
                let dna = self.sequence(&input)?;
                let ref_dna = reference.as_deref().map(|r| self.sequence(r)).transpose()?;
                let mut scan = defect_scan(dna, ref_dna, &params)?;
                scan.seq_id = input;
                AnalysisOutput::DefectScan(scan)
            }
            Operation::Compare {
                first,
                second,
                reference,
                with_defects,
            } => {
                let a = self.sequence(&first)?;
                let b = self.sequence(&second)?;
                let ref_dna = reference.as_deref().map(|r| self.sequence(r)).transpose()?;
                let mut report = compare_pair(a, b, ref_dna, with_defects, &params)?;
                report.first.id = first;
                report.second.id = second;
                for (scan, id) in report
                    .defects
                    .iter_mut()
                    .zip([&report.first.id, &report.second.id])
                {
                    scan.seq_id = id.clone();
                }
                if let Some(reference) = reference {
                    report.reference_id = Some(reference);
                }
                result.messages.push(format!(
                    "Similarity of '{}' and '{}': {:.2}%",
                    report.first.id, report.second.id, report.comparison.similarity_percent
                ));
                AnalysisOutput::Comparison(Box::new(report))
            }
            Operation::SetParameter { name, value } => {
                self.set_parameter(&name, value)?;
                result
                    .messages
                    .push(format!("Set parameter '{name}'"));
                AnalysisOutput::None
            }
        };
        result.output = output;

        Ok(result)
    }
}

impl Engine for CompareEngine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let run_id = "interactive".to_string();
        let result = self.apply_internal(op.clone())?;
        debug!("{} applied ({run_id})", result.op_id);
        self.journal.push(OperationRecord {
            run_id,
            op,
            result: result.clone(),
        });
        Ok(result)
    }

    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError> {
        info!("Running workflow '{}' ({} op(s))", wf.run_id, wf.ops.len());
        let mut results = Vec::new();
        for op in &wf.ops {
            let result = self.apply_internal(op.clone())?;
            self.journal.push(OperationRecord {
                run_id: wf.run_id.clone(),
                op: op.clone(),
                result: result.clone(),
            });
            results.push(result);
        }
        Ok(results)
    }

    fn snapshot(&self) -> &SessionState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn load(engine: &mut CompareEngine, text: &str) -> SeqId {
        let res = engine
            .apply(Operation::LoadFasta {
                text: text.to_string(),
                as_id: None,
            })
            .unwrap();
        res.loaded_seq_ids[0].clone()
    }

    #[test]
    fn test_load_and_gc() {
        let mut engine = CompareEngine::new();
        let id = load(&mut engine, ">s1\nGGCCAATT\n");
        assert_eq!(id, "s1");
        let res = engine
            .apply(Operation::GcContent { input: id.clone() })
            .unwrap();
        assert_eq!(
            res.output,
            AnalysisOutput::GcContent {
                seq_id: id,
                gc_percent: 50.0
            }
        );
        assert_eq!(res.op_id, "op-2");
    }

    #[test]
    fn test_duplicate_ids_are_suffixed() {
        let mut engine = CompareEngine::new();
        assert_eq!(load(&mut engine, ">x\nACGT"), "x");
        assert_eq!(load(&mut engine, ">x\nTTTT"), "x_2");
        assert_eq!(load(&mut engine, ">x\nGGGG"), "x_3");
        assert_eq!(engine.state().sequences.len(), 3);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let mut engine = CompareEngine::new();
        let err = engine
            .apply(Operation::LoadFasta {
                text: "not fasta".to_string(),
                as_id: None,
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Parse);
        assert!(engine.operation_log().is_empty());
    }

    #[test]
    fn test_unknown_sequence() {
        let mut engine = CompareEngine::new();
        let err = engine
            .apply(Operation::AmbiguityScan {
                input: "nope".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_empty_record_gc_fails() {
        let mut engine = CompareEngine::new();
        let res = engine
            .apply(Operation::LoadFasta {
                text: ">e\n".to_string(),
                as_id: None,
            })
            .unwrap();
        assert_eq!(res.warnings.len(), 1);
        let err = engine
            .apply(Operation::GcContent {
                input: "e".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptySequence);
    }

    #[test]
    fn test_motif_search_uses_session_default() {
        let mut engine = CompareEngine::new();
        let id = load(&mut engine, ">m\nATGATGCCATG");
        let res = engine
            .apply(Operation::MotifSearch {
                input: id.clone(),
                motif: None,
            })
            .unwrap();
        assert_eq!(
            res.output,
            AnalysisOutput::MotifPositions {
                seq_id: id,
                motif: "ATG".to_string(),
                count: 3,
                positions: vec![1, 4, 9]
            }
        );
    }

    #[test]
    fn test_set_parameter() {
        let mut engine = CompareEngine::new();
        engine
            .apply(Operation::SetParameter {
                name: "min_orf".to_string(),
                value: serde_json::json!(90),
            })
            .unwrap();
        assert_eq!(engine.parameters().min_orf, 90);

        let err = engine
            .apply(Operation::SetParameter {
                name: "no_such_knob".to_string(),
                value: serde_json::json!(1),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unsupported);

        let err = engine
            .apply(Operation::SetParameter {
                name: "window_size".to_string(),
                value: serde_json::json!(0),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let err = engine
            .apply(Operation::SetParameter {
                name: "motif".to_string(),
                value: serde_json::json!(12),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(engine.parameters().window_size, 500);
    }

    #[test]
    fn test_snp_diff_operation() {
        let mut engine = CompareEngine::new();
        let q = load(&mut engine, ">q\nACGT");
        let r = load(&mut engine, ">r\nACGA");
        let res = engine
            .apply(Operation::SnpDiff {
                input: q,
                reference: r,
                max_len: Some(10),
            })
            .unwrap();
        match res.output {
            AnalysisOutput::SnpDiff { result, .. } => {
                assert_eq!(result.checked_bases, 4);
                assert_eq!(result.snp_count, 1);
            }
            other => panic!("unexpected output {other:?}"),
        }
    }

    #[test]
    fn test_compare_report() {
        let mut engine = CompareEngine::new();
        let a = load(&mut engine, ">a\nATGGCCATGNNNNNGCTAA");
        let b = load(&mut engine, ">b\nATGGCCATGAAAAAGCTAA");
        let res = engine
            .apply(Operation::Compare {
                first: a,
                second: b,
                reference: None,
                with_defects: true,
            })
            .unwrap();
        let AnalysisOutput::Comparison(report) = res.output else {
            panic!("expected a comparison report");
        };
        assert_eq!(report.first.id, "a");
        assert_eq!(report.second.id, "b");
        assert_eq!(report.first.motif_positions, vec![1, 7]);
        assert_eq!(report.comparison.motif_count_difference, 0);
        // 14 of 19 bases align
        assert!((report.comparison.similarity_percent - 14.0 / 19.0 * 100.0).abs() < 1e-9);
        assert_eq!(report.defects.len(), 2);
        assert_eq!(report.defects[0].seq_id, "a");
        assert_eq!(report.defects[0].ambiguity.n_runs.len(), 1);
        assert!(report.defects[1].ambiguity.n_runs.is_empty());
        assert!(report.defects[0].snp_diff.is_none());
    }

    #[test]
    fn test_workflow_stops_at_first_error() {
        let mut engine = CompareEngine::new();
        let wf: Workflow = serde_json::from_str(
            r#"{
                "run_id": "wf-1",
                "ops": [
                    {"LoadFasta": {"text": ">w\nACGTACGT\n", "as_id": null}},
                    {"GcContent": {"input": "w"}},
                    {"GcContent": {"input": "missing"}},
                    {"AmbiguityScan": {"input": "w"}}
                ]
            }"#,
        )
        .unwrap();
        let err = engine.apply_workflow(wf).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        let log = engine.operation_log();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|r| r.run_id == "wf-1"));
        assert_eq!(log[1].result.op_id, "op-2");
    }

    fn item_count(output: &AnalysisOutput) -> usize {
        match output {
            AnalysisOutput::GcWindows { windows, .. } => windows.len(),
            AnalysisOutput::GcOutliers { outliers, .. } => outliers.len(),
            AnalysisOutput::PrematureStops { flags, .. } => flags.len(),
            other => panic!("unexpected output {other:?}"),
        }
    }

    // t = ATGTAA GGGCCC AAATTT: GC 16.7 / 100 / 0 in windows of 6
    #[rstest]
    #[case::gc_windows(Operation::SlidingGc { input: "t".to_string(), window_size: Some(6) }, 3, 0)]
    #[case::gc_windows_default_size(Operation::SlidingGc { input: "t".to_string(), window_size: None }, 1, 0)]
    #[case::gc_outliers(
        Operation::GcOutliers { input: "t".to_string(), window_size: Some(6), z_threshold: Some(1.0) },
        1,
        0
    )]
    #[case::gc_outliers_too_few_windows(
        Operation::GcOutliers { input: "t".to_string(), window_size: Some(9), z_threshold: None },
        0,
        1
    )]
    #[case::premature_stops(Operation::PrematureStops { input: "t".to_string(), min_orf: None }, 1, 0)]
    #[case::premature_stops_short_min(Operation::PrematureStops { input: "t".to_string(), min_orf: Some(3) }, 0, 0)]
    fn test_window_and_frame_operations(
        #[case] op: Operation,
        #[case] expected_items: usize,
        #[case] expected_warnings: usize,
    ) {
        let mut engine = CompareEngine::new();
        load(&mut engine, ">t\nATGTAAGGGCCCAAATTT\n");
        let first = engine.apply(op.clone()).unwrap();
        assert_eq!(item_count(&first.output), expected_items);
        assert_eq!(first.warnings.len(), expected_warnings);
        // Same input, same output; only the op id moves on
        let second = engine.apply(op).unwrap();
        assert_eq!(second.output, first.output);
        assert_eq!(second.warnings, first.warnings);
        assert_ne!(second.op_id, first.op_id);
    }

    #[test]
    fn test_capabilities() {
        let caps = CompareEngine::capabilities();
        assert!(caps.supported_operations.contains(&"Compare".to_string()));
        assert_eq!(caps.default_parameters, AnalysisParameters::default());
    }
}
