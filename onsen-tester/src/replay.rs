//! Replay of recorded snapshots and player choices.
use anyhow::{Context, Result};
use onsen_game::{
    ActionKind, CharacterResolver, RecoveryRecord, ResultSink, TurnEngine, TurnReport,
    TurnSnapshot,
};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceEntry {
    pub turn: u32,
    pub action: ActionKind,
    #[serde(default)]
    pub failed: bool,
}

/// One line of a replay file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayEntry {
    Snapshot(Box<TurnSnapshot>),
    Choice(ChoiceEntry),
    VitalSpent(i32),
}

/// Parse JSON lines; blank lines and `#` comments are skipped.
pub fn read_replay<R: BufRead>(reader: R) -> Result<Vec<ReplayEntry>> {
    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let entry = serde_json::from_str(trimmed)
            .with_context(|| format!("line {line_no} is not a replay entry"))?;
        entries.push(entry);
    }
    Ok(entries)
}

#[derive(Debug, Default, Serialize)]
pub struct ReplaySummary {
    pub reports: Vec<TurnReport>,
    pub records: Vec<RecoveryRecord>,
    pub skipped_snapshots: usize,
    pub unmatched_choices: usize,
}

/// Feed entries through the engine, appending recovery records to `sink`.
///
/// A failing sink is logged and does not stop the replay.
pub fn run_replay<R, S>(
    engine: &mut TurnEngine<R>,
    entries: &[ReplayEntry],
    sink: &mut S,
) -> ReplaySummary
where
    R: CharacterResolver,
    S: ResultSink,
    S::Error: std::fmt::Display,
{
    let mut summary = ReplaySummary::default();
    for entry in entries {
        match entry {
            ReplayEntry::Snapshot(snapshot) => match engine.observe(snapshot) {
                Some(report) => {
                    if let Some(record) = report.recovery_record() {
                        if let Err(err) = sink.append(&record) {
                            log::error!("could not append recovery record: {err}");
                        }
                        summary.records.push(record);
                    }
                    summary.reports.push(report);
                }
                None => summary.skipped_snapshots += 1,
            },
            ReplayEntry::Choice(choice) => {
                if !engine.record_choice(choice.turn, choice.action, choice.failed) {
                    log::warn!("choice for unseen turn {} ignored", choice.turn);
                    summary.unmatched_choices += 1;
                }
            }
            ReplayEntry::VitalSpent(amount) => engine.record_vital_spent(*amount),
        }
    }
    summary
}
