mod loader;
mod replay;
mod reports;
mod results_log;
mod synthetic;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use onsen_game::{RecoveryRecord, ResultSink, TurnEngine};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use loader::FileLoader;
use replay::{read_replay, run_replay};
use results_log::FileSink;
use synthetic::run_synthetic;
use util::parse_seeds;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "onsen-tester", version = "0.1.0")]
#[command(about = "Replays recorded onsen dig turns and stress-tests the analysis engine")]
struct Args {
    /// Replay file of JSON lines (snapshot / choice / vital_spent entries)
    #[arg(long, conflicts_with = "synthetic")]
    input: Option<PathBuf>,

    /// Generate seeded synthetic play-throughs instead of replaying a file
    #[arg(long)]
    synthetic: bool,

    /// Seeds for synthetic runs (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Synthetic play-throughs per seed
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Append spontaneous super recoveries to this file
    #[arg(long)]
    results_log: Option<PathBuf>,

    /// Scenario rules override (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Support card catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Result log destination: a file when requested, memory otherwise.
enum RecordSink {
    File(FileSink),
    Memory(Vec<RecoveryRecord>),
}

impl ResultSink for RecordSink {
    type Error = std::io::Error;

    fn append(&mut self, record: &RecoveryRecord) -> Result<(), Self::Error> {
        match self {
            Self::File(sink) => sink.append(record),
            Self::Memory(records) => {
                records.push(*record);
                Ok(())
            }
        }
    }
}

impl RecordSink {
    fn new(path: Option<PathBuf>) -> Self {
        path.map_or_else(|| Self::Memory(Vec::new()), |p| Self::File(FileSink::new(p)))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let loader = FileLoader::new(args.rules.clone(), args.catalog.clone());
    let start_time = Instant::now();
    let mut sink = RecordSink::new(args.results_log.clone());

    if args.synthetic {
        announce_banner(&args);
        let passed = run_synthetic_mode(&args, &loader, &mut sink, start_time)?;
        if !passed {
            std::process::exit(1);
        }
        return Ok(());
    }

    let Some(input) = args.input.clone() else {
        bail!("either --input <FILE> or --synthetic is required");
    };
    announce_banner(&args);
    run_replay_mode(&args, &loader, &input, &mut sink, start_time)
}

fn announce_banner(args: &Args) {
    if matches!(args.report, ReportFormat::Console) && args.output.is_none() {
        println!("{}", "♨️  Onsen Dig Tester".bright_cyan().bold());
        println!("{}", "====================".cyan());
    }
}

fn run_replay_mode(
    args: &Args,
    loader: &FileLoader,
    input: &Path,
    sink: &mut RecordSink,
    start_time: Instant,
) -> Result<()> {
    let file =
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let entries = read_replay(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let mut engine = TurnEngine::from_loader(loader)?;
    let summary = run_replay(&mut engine, &entries, sink);
    if args.verbose {
        eprintln!(
            "replayed {} entries into {} reports",
            entries.len(),
            summary.reports.len()
        );
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => reports::generate_replay_json_report(&mut output_target, &summary)?,
        ReportFormat::Csv => reports::generate_replay_csv_report(&mut output_target, &summary)?,
        ReportFormat::Console => reports::generate_replay_console_report(
            &mut output_target,
            &summary,
            start_time.elapsed(),
        )?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn run_synthetic_mode(
    args: &Args,
    loader: &FileLoader,
    sink: &mut RecordSink,
    start_time: Instant,
) -> Result<bool> {
    let seeds = parse_seeds(&args.seeds)?;
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    let mut results = Vec::new();
    for seed in seeds {
        for run in 0..args.runs {
            let mut engine = TurnEngine::from_loader(loader)?;
            let result = run_synthetic(&mut engine, seed, run, sink);
            if args.verbose {
                eprintln!(
                    "seed {seed} run {run}: {}",
                    if result.passed { "pass" } else { "fail" }
                );
            }
            results.push(result);
        }
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => reports::generate_synthetic_json_report(&mut output_target, &results)?,
        ReportFormat::Csv => reports::generate_synthetic_csv_report(&mut output_target, &results)?,
        ReportFormat::Console => reports::generate_synthetic_console_report(
            &mut output_target,
            &results,
            start_time.elapsed(),
        )?,
    }
    output_target.flush_inner()?;
    Ok(results.iter().all(|r| r.passed))
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_parse() {
        let args = Args::parse_from(["onsen-tester", "--synthetic"]);
        assert!(args.synthetic);
        assert_eq!(args.seeds, "1337");
        assert_eq!(args.runs, 1);
        assert!(matches!(args.report, ReportFormat::Console));
    }

    #[test]
    fn memory_sink_collects_records() {
        let mut sink = RecordSink::new(None);
        let record = RecoveryRecord {
            turn: 5,
            friend_rarity: 1,
            spent_before: 10,
            spent_after: 20,
        };
        sink.append(&record).unwrap();
        assert!(matches!(sink, RecordSink::Memory(ref records) if records == &[record]));
    }

    #[test]
    fn output_target_writes_files() {
        let path = std::env::temp_dir().join(format!(
            "onsen-output-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let mut target = OutputTarget::new(Some(path.clone())).unwrap();
        writeln!(target, "hello").unwrap();
        target.flush_inner().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }
}
