use crate::error::{EngineError, ErrorCode};
use bio::io::fasta;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};

type DNAstring = Vec<u8>;

/// A named nucleotide sequence, uppercased and stripped of whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DNAsequence {
    name: String,
    description: Option<String>,
    seq: DNAstring,
}

impl DNAsequence {
    pub fn new(name: &str, sequence: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            seq: Self::normalize(sequence),
        }
    }

    /// Parses the first record of a FASTA document. Anything after the
    /// first record is ignored.
    pub fn from_fasta_text(text: &str) -> Result<Self, EngineError> {
        // Blank lines ahead of the first header are tolerated, anything else is not
        let text = text.trim_start();
        if !text.starts_with('>') {
            return Err(EngineError::new(
                ErrorCode::Parse,
                "No FASTA record found: input does not start with a '>' header",
            ));
        }
        let mut records = fasta::Reader::new(text.as_bytes()).records();
        match records.next() {
            Some(Ok(record)) => {
                // Symbols are single bytes from here on
                if let Some(pos) = record.seq().iter().position(|b| !b.is_ascii()) {
                    return Err(EngineError::new(
                        ErrorCode::Parse,
                        format!(
                            "Record '{}' has a non-ASCII symbol in sequence byte {}",
                            record.id(),
                            pos + 1
                        ),
                    ));
                }
                let ret = Self::from_fasta_record(&record);
                debug!("Parsed FASTA record '{}' ({} bp)", ret.name, ret.len());
                Ok(ret)
            }
            Some(Err(e)) => Err(EngineError::new(
                ErrorCode::Parse,
                format!("Could not parse FASTA record: {e}"),
            )),
            None => Err(EngineError::new(
                ErrorCode::Parse,
                "No FASTA record found",
            )),
        }
    }

    pub fn from_fasta_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            EngineError::new(
                ErrorCode::Io,
                format!("Could not read FASTA file '{}': {e}", path.display()),
            )
        })?;
        Self::from_fasta_text(&text).map_err(|e| EngineError {
            message: format!("{}: {}", path.display(), e.message),
            ..e
        })
    }

    pub fn from_fasta_record(record: &fasta::Record) -> Self {
        let mut ret = Self::new(record.id(), record.seq());
        ret.description = record.desc().map(|d| d.to_string());
        ret
    }

    fn normalize(s: &[u8]) -> DNAstring {
        s.iter()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }

    #[inline(always)]
    pub fn forward(&self) -> &[u8] {
        &self.seq
    }

    pub fn get_forward_string(&self) -> String {
        String::from_utf8_lossy(&self.seq).to_string()
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

impl fmt::Display for DNAsequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bp)", self.name, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_fasta_text() {
        let dna = DNAsequence::from_fasta_text(">seq1 some plasmid\nacgt\nNNac gt\n").unwrap();
        assert_eq!(dna.name(), "seq1");
        assert_eq!(dna.description(), Some("some plasmid"));
        assert_eq!(dna.get_forward_string(), "ACGTNNACGT");
        assert_eq!(dna.len(), 10);
    }

    #[test]
    fn test_only_first_record_is_used() {
        let dna = DNAsequence::from_fasta_text(">a\nAAAA\n>b\nCCCC\n").unwrap();
        assert_eq!(dna.name(), "a");
        assert_eq!(dna.forward(), b"AAAA");
    }

    #[test]
    fn test_crlf_and_leading_blank_lines() {
        let dna = DNAsequence::from_fasta_text("\n\r\n>x\r\nAC\r\nGT\r\n").unwrap();
        assert_eq!(dna.name(), "x");
        assert_eq!(dna.forward(), b"ACGT");
    }

    #[test]
    fn test_header_without_sequence() {
        let dna = DNAsequence::from_fasta_text(">empty\n").unwrap();
        assert!(dna.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        for text in ["", "   \n", "ACGTACGT\n", "# comment\n>x\nACGT"] {
            let err = DNAsequence::from_fasta_text(text).unwrap_err();
            assert_eq!(err.code, ErrorCode::Parse, "input {text:?}");
        }
    }

    #[test]
    fn test_non_ascii_sequence_is_rejected() {
        let err = DNAsequence::from_fasta_text(">u\nACÉ\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::Parse);
        // Headers may carry any text
        let dna = DNAsequence::from_fasta_text(">u Échantillon\nACGT\n").unwrap();
        assert_eq!(dna.description(), Some("Échantillon"));
    }

    #[test]
    fn test_from_fasta_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ">chr_test\nggcc\naatt").unwrap();
        let dna = DNAsequence::from_fasta_file(file.path()).unwrap();
        assert_eq!(dna.get_forward_string(), "GGCCAATT");

        let err = DNAsequence::from_fasta_file("/nonexistent/file.fa").unwrap_err();
        assert_eq!(err.code, ErrorCode::Io);
    }
}
