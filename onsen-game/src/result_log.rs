//! Result log of recovery triggers nothing in the story log explains.
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

/// One spontaneous recovery trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    pub turn: u32,
    /// Rarity of the friend card in the deck, 0 without one.
    pub friend_rarity: u32,
    /// Vital spent as of the snapshot before the last spending update.
    pub spent_before: i32,
    /// Vital spent when the trigger was observed.
    pub spent_after: i32,
}

impl RecoveryRecord {
    /// Comma-separated log line, newline terminated.
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for RecoveryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.turn, self.friend_rarity, self.spent_before, self.spent_after
        )
    }
}

/// Destination for recovery records.
///
/// The engine never calls a sink itself; a failing sink cannot disturb
/// play-through state.
pub trait ResultSink {
    type Error;

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Implementations report their own write failures.
    fn append(&mut self, record: &RecoveryRecord) -> Result<(), Self::Error>;
}

impl ResultSink for Vec<RecoveryRecord> {
    type Error = Infallible;

    fn append(&mut self, record: &RecoveryRecord) -> Result<(), Self::Error> {
        self.push(*record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_line_keeps_field_order() {
        let record = RecoveryRecord {
            turn: 41,
            friend_rarity: 3,
            spent_before: 118,
            spent_after: 137,
        };
        assert_eq!(record.to_csv_line(), "41, 3, 118, 137\n");
    }

    #[test]
    fn vectors_collect_records() {
        let record = RecoveryRecord {
            turn: 9,
            friend_rarity: 0,
            spent_before: 0,
            spent_after: 22,
        };
        let mut sink: Vec<RecoveryRecord> = Vec::new();
        ResultSink::append(&mut sink, &record).unwrap();
        assert_eq!(sink, vec![record]);
    }
}
