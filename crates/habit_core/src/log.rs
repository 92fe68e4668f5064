use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datekey::{DateKey, RawDate};

/// One record of a habit's status on one calendar day, as fetched from
/// the record store. `notes` is carried through untouched; the engine
/// never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionLog {
    pub habit_id: String,
    pub date: RawDate,
    pub completed: bool,
    pub notes: Option<String>,
}

/// Authoritative day -> log map for one habit.
///
/// The store does not guarantee one record per day. When two records
/// normalize to the same day, the one later in input order wins;
/// callers supply logs in fetch order with the most authoritative
/// record last, so an optimistic local entry followed by the
/// server-confirmed one resolves to the latter. Records whose date
/// cannot be normalized are dropped and counted, never fatal.
#[derive(Debug, Clone, Default)]
pub struct LogIndex {
    by_day: BTreeMap<NaiveDate, CompletionLog>,
    invalid_dropped: usize,
}

impl LogIndex {
    pub fn from_logs(logs: &[CompletionLog]) -> Self {
        let mut index = Self::default();
        for log in logs {
            match DateKey::from_raw(&log.date) {
                DateKey::Day(day) => {
                    index.by_day.insert(day, log.clone());
                }
                DateKey::Invalid => {
                    tracing::debug!(
                        habit_id = %log.habit_id,
                        date = ?log.date,
                        "dropping record with unusable date"
                    );
                    index.invalid_dropped += 1;
                }
            }
        }
        index
    }

    pub fn get(&self, day: NaiveDate) -> Option<&CompletionLog> {
        self.by_day.get(&day)
    }

    /// Keyed lookup; `Invalid` matches nothing.
    pub fn lookup(&self, key: DateKey) -> Option<&CompletionLog> {
        key.day().and_then(|day| self.get(day))
    }

    pub fn is_completed(&self, day: NaiveDate) -> bool {
        self.get(day).map(|log| log.completed).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.by_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// How many fetched records were dropped for an unusable date.
    pub fn invalid_dropped(&self) -> usize {
        self.invalid_dropped
    }

    /// Days with a `completed = true` log, ascending.
    pub fn completed_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_day
            .iter()
            .filter(|(_, log)| log.completed)
            .map(|(day, _)| *day)
    }

    pub fn total_completions(&self) -> u32 {
        self.by_day.values().filter(|log| log.completed).count() as u32
    }

    pub fn last_completed(&self) -> Option<NaiveDate> {
        self.by_day
            .iter()
            .rev()
            .find(|(_, log)| log.completed)
            .map(|(day, _)| *day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn log(date: impl Into<RawDate>, completed: bool, notes: Option<&str>) -> CompletionLog {
        CompletionLog {
            habit_id: "habit-1".to_string(),
            date: date.into(),
            completed,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn later_duplicate_wins() {
        let logs = vec![
            log("2024-03-10", true, Some("optimistic local entry")),
            log("2024-03-11", true, None),
            log("2024-03-10", false, Some("server confirmed")),
        ];
        let index = LogIndex::from_logs(&logs);
        assert_eq!(index.len(), 2);
        let resolved = index.get(day(2024, 3, 10)).unwrap();
        assert!(!resolved.completed);
        assert_eq!(resolved.notes.as_deref(), Some("server confirmed"));
    }

    #[test]
    fn duplicates_in_mixed_encodings_still_collapse() {
        let logs = vec![
            log("2024-03-10 00:00:00", true, None),
            log("2024-03-10T00:00:00Z", false, None),
        ];
        let index = LogIndex::from_logs(&logs);
        assert_eq!(index.len(), 1);
        assert!(!index.is_completed(day(2024, 3, 10)));
    }

    #[test]
    fn invalid_dates_are_dropped_and_counted() {
        let logs = vec![
            log("garbage", true, None),
            log("2024-03-10", true, None),
            log("2024-02-31", true, None),
        ];
        let index = LogIndex::from_logs(&logs);
        assert_eq!(index.len(), 1);
        assert_eq!(index.invalid_dropped(), 2);
        assert_eq!(index.total_completions(), 1);
    }

    #[test]
    fn lookup_with_invalid_key_matches_nothing() {
        let index = LogIndex::from_logs(&[log("2024-03-10", true, None)]);
        assert!(index.lookup(DateKey::Invalid).is_none());
        assert!(index.lookup(DateKey::Day(day(2024, 3, 10))).is_some());
    }

    #[test]
    fn completed_days_are_sorted_and_skip_unchecked_days() {
        let logs = vec![
            log("2024-03-12", true, None),
            log("2024-03-10", true, None),
            log("2024-03-11", false, None),
        ];
        let index = LogIndex::from_logs(&logs);
        let days: Vec<NaiveDate> = index.completed_days().collect();
        assert_eq!(days, vec![day(2024, 3, 10), day(2024, 3, 12)]);
        assert_eq!(index.last_completed(), Some(day(2024, 3, 12)));
        assert_eq!(index.total_completions(), 2);
    }

    #[test]
    fn empty_input_is_a_valid_empty_index() {
        let index = LogIndex::from_logs(&[]);
        assert!(index.is_empty());
        assert_eq!(index.total_completions(), 0);
        assert_eq!(index.last_completed(), None);
        assert_eq!(index.invalid_dropped(), 0);
    }
}
