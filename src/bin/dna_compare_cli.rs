use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use dna_compare::{
    about,
    dna_sequence::DNAsequence,
    engine::{CompareEngine, Engine, Operation, Workflow, compare_pair, defect_scan},
    gc_contents::{gc_content, sliding_gc},
    motif::{MotifPreset, motif_search, motif_search_iupac},
    protocol::{AnalysisParameters, DEFAULT_MOTIF, DEFAULT_WINDOW_SIZE, GcWindow},
};
use log::{debug, info};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug)]
#[command(
    name = "dna_compare_cli",
    version = about::DNA_COMPARE_DISPLAY_VERSION,
    long_version = about::LONG_VERSION,
    about = "Compare DNA sequences and screen them for quality defects"
)]
struct Cli {
    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Raise log level (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full comparison report of two FASTA files
    Compare {
        first: PathBuf,
        second: PathBuf,
        /// Reference FASTA for the SNP diff; implies --defects
        #[arg(long)]
        reference: Option<PathBuf>,
        /// Include a defect scan of both sequences
        #[arg(long)]
        defects: bool,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Defect scan of one FASTA file
    Scan {
        file: PathBuf,
        #[arg(long)]
        reference: Option<PathBuf>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// GC percent and windowed GC profile
    Gc {
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
        window_size: usize,
    },
    /// Motif positions (1-based, overlapping)
    Motif {
        file: PathBuf,
        #[arg(long, default_value = DEFAULT_MOTIF)]
        motif: String,
        /// Treat ambiguity codes in the motif as base sets
        #[arg(long)]
        iupac: bool,
    },
    /// Apply one engine operation; pass @file.json instead of inline JSON
    Op {
        operation: String,
        /// FASTA files loaded before the operation runs
        #[arg(long = "load")]
        load: Vec<PathBuf>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Apply a workflow of engine operations; pass @file.json instead of inline JSON
    Workflow {
        workflow: String,
        #[arg(long = "load")]
        load: Vec<PathBuf>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Print the engine capability document
    Capabilities,
}

/// Analysis parameters: a JSON document first, then individual flags on top.
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Parameter document, inline JSON or @file.json
    #[arg(long)]
    params: Option<String>,
    #[arg(long)]
    motif: Option<String>,
    #[arg(long)]
    window_size: Option<usize>,
    #[arg(long)]
    defect_window_size: Option<usize>,
    #[arg(long)]
    z_threshold: Option<f64>,
    #[arg(long)]
    min_orf: Option<usize>,
    #[arg(long)]
    similarity_max_len: Option<usize>,
    #[arg(long)]
    snp_max_len: Option<usize>,
}

impl ParamArgs {
    fn resolve(&self) -> Result<AnalysisParameters> {
        let mut params = match &self.params {
            Some(arg) => {
                let text = load_json_arg(arg)?;
                serde_json::from_str::<AnalysisParameters>(&text)
                    .context("Invalid parameter document")?
            }
            None => AnalysisParameters::default(),
        };
        if let Some(motif) = &self.motif {
            params.motif = motif.clone();
        }
        if let Some(v) = self.window_size {
            params.window_size = v;
        }
        if let Some(v) = self.defect_window_size {
            params.defect_window_size = v;
        }
        if let Some(v) = self.z_threshold {
            params.z_threshold = v;
        }
        if let Some(v) = self.min_orf {
            params.min_orf = v;
        }
        if let Some(v) = self.similarity_max_len {
            params.similarity_max_len = v;
        }
        if let Some(v) = self.snp_max_len {
            params.snp_max_len = v;
        }
        params.validate().map_err(anyhow::Error::msg)?;
        debug!("Using parameters {params:?}");
        Ok(params)
    }
}

#[derive(Serialize)]
struct GcProfile {
    seq_id: String,
    length: usize,
    gc_percent: f64,
    window_size: usize,
    windows: Vec<GcWindow>,
}

#[derive(Serialize)]
struct MotifHits {
    seq_id: String,
    motif: String,
    iupac: bool,
    count: usize,
    positions: Vec<usize>,
}

fn load_json_arg(value: &str) -> Result<String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).with_context(|| format!("Could not read JSON file '{path}'"))
    } else {
        Ok(value.to_string())
    }
}

fn load_fasta(path: &Path) -> Result<DNAsequence> {
    let dna = DNAsequence::from_fasta_file(path)
        .with_context(|| format!("Could not load FASTA file '{}'", path.display()))?;
    info!("Loaded {dna} from '{}'", path.display());
    Ok(dna)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn session(load: &[PathBuf], params: &ParamArgs) -> Result<CompareEngine> {
    let mut engine = CompareEngine::with_parameters(params.resolve()?)?;
    for path in load {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read FASTA file '{}'", path.display()))?;
        let result = engine
            .apply(Operation::LoadFasta { text, as_id: None })
            .with_context(|| format!("Could not load FASTA file '{}'", path.display()))?;
        for message in &result.messages {
            info!("{message}");
        }
    }
    Ok(engine)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let pretty = cli.pretty;

    match cli.command {
        Command::Compare {
            first,
            second,
            reference,
            defects,
            params,
        } => {
            let params = params.resolve()?;
            let first = load_fasta(&first)?;
            let second = load_fasta(&second)?;
            let reference = reference.as_deref().map(load_fasta).transpose()?;
            let with_defects = defects || reference.is_some();
            let report = compare_pair(&first, &second, reference.as_ref(), with_defects, &params)?;
            print_json(&report, pretty)
        }
        Command::Scan {
            file,
            reference,
            params,
        } => {
            let params = params.resolve()?;
            let dna = load_fasta(&file)?;
            let reference = reference.as_deref().map(load_fasta).transpose()?;
            print_json(&defect_scan(&dna, reference.as_ref(), &params)?, pretty)
        }
        Command::Gc { file, window_size } => {
            let dna = load_fasta(&file)?;
            let profile = GcProfile {
                seq_id: dna.name().to_string(),
                length: dna.len(),
                gc_percent: gc_content(dna.forward())?,
                window_size,
                windows: sliding_gc(dna.forward(), window_size)?.collect(),
            };
            print_json(&profile, pretty)
        }
        Command::Motif { file, motif, iupac } => {
            let dna = load_fasta(&file)?;
            let preset = MotifPreset::from(motif.as_str());
            debug!("Searching for {preset:?}");
            let motif = preset.motif().to_string();
            let positions = if iupac {
                motif_search_iupac(dna.forward(), &motif)
            } else {
                motif_search(dna.forward(), &motif)
            };
            let hits = MotifHits {
                seq_id: dna.name().to_string(),
                motif,
                iupac,
                count: positions.len(),
                positions,
            };
            print_json(&hits, pretty)
        }
        Command::Op {
            operation,
            load,
            params,
        } => {
            let mut engine = session(&load, &params)?;
            let json = load_json_arg(&operation)?;
            let op: Operation = serde_json::from_str(&json).context("Invalid operation JSON")?;
            let result = engine.apply(op)?;
            print_json(&result, pretty)
        }
        Command::Workflow {
            workflow,
            load,
            params,
        } => {
            let mut engine = session(&load, &params)?;
            let json = load_json_arg(&workflow)?;
            let workflow: Workflow =
                serde_json::from_str(&json).context("Invalid workflow JSON")?;
            let results = engine.apply_workflow(workflow)?;
            print_json(&results, pretty)
        }
        Command::Capabilities => print_json(&CompareEngine::capabilities(), pretty),
    }
}
