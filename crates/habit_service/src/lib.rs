use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Weekday};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use habit_core::{
    build_grid, compute_streak, CalendarCell, CalendarWindow, CompletionLog, LogIndex, RawDate,
    StreakPolicy, StreakResult, DEFAULT_WEEK_START,
};

/// Per-habit summary handed to dashboard surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSummary {
    pub habit_id: String,
    pub name: String,
    pub policy: StreakPolicy,
    pub streak: StreakResult,
    /// Fetched records dropped for an unusable date, surfaced for
    /// diagnostics.
    pub dropped_records: usize,
}

/// Aggregate of every registered habit's statistics for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencySnapshot {
    pub today: NaiveDate,
    pub habits: Vec<HabitSummary>,
}

/// The write the caller should issue against the record store to
/// toggle one day. The service never performs the write; the caller
/// applies it and feeds the refreshed snapshot back via
/// [`HabitService::replace_logs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum TogglePlan {
    /// No log exists for the day yet: create one, completed.
    Create { log: CompletionLog },
    /// A log exists: update it in place with the flag flipped.
    Update { log: CompletionLog },
}

impl TogglePlan {
    pub fn log(&self) -> &CompletionLog {
        match self {
            Self::Create { log } | Self::Update { log } => log,
        }
    }
}

#[derive(Debug)]
struct HabitEntry {
    name: String,
    policy: StreakPolicy,
    index: LogIndex,
}

/// In-process façade between the UI surfaces and the consistency
/// engine. Holds the latest log snapshot per habit and recomputes
/// engine outputs from it on every call; staleness and cache
/// invalidation stay with the caller that fetches the snapshots.
pub struct HabitService {
    week_start: Weekday,
    habits: RwLock<HashMap<String, HabitEntry>>,
}

pub struct HabitServiceBuilder {
    week_start: Weekday,
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self {
            week_start: DEFAULT_WEEK_START,
        }
    }

    /// Weekday grids and weekly streak partitions start on. One value
    /// serves both so they cannot disagree.
    pub fn week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn build(self) -> HabitService {
        HabitService {
            week_start: self.week_start,
            habits: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for HabitServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Register a habit or replace the policy of one already known.
    /// An existing log snapshot is kept.
    #[instrument(skip(self, name, policy))]
    pub fn register_habit(&self, habit_id: &str, name: &str, policy: StreakPolicy) {
        let mut habits = self.habits.write();
        match habits.get_mut(habit_id) {
            Some(entry) => {
                entry.name = name.to_string();
                entry.policy = policy;
            }
            None => {
                habits.insert(
                    habit_id.to_string(),
                    HabitEntry {
                        name: name.to_string(),
                        policy,
                        index: LogIndex::default(),
                    },
                );
            }
        }
    }

    pub fn list_habits(&self) -> Vec<String> {
        let habits = self.habits.read();
        let mut ids: Vec<String> = habits.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Swap a habit's log snapshot wholesale, in fetch order (most
    /// authoritative record last).
    #[instrument(skip(self, logs))]
    pub fn replace_logs(&self, habit_id: &str, logs: &[CompletionLog]) -> Result<()> {
        let index = LogIndex::from_logs(logs);
        if index.invalid_dropped() > 0 {
            tracing::warn!(
                habit_id,
                dropped = index.invalid_dropped(),
                "snapshot contained records with unusable dates"
            );
        }
        let mut habits = self.habits.write();
        let entry = habits
            .get_mut(habit_id)
            .ok_or_else(|| anyhow!("habit `{habit_id}` not registered"))?;
        entry.index = index;
        Ok(())
    }

    pub fn streak(&self, habit_id: &str, today: NaiveDate) -> Result<StreakResult> {
        let habits = self.habits.read();
        let entry = habits
            .get(habit_id)
            .ok_or_else(|| anyhow!("habit `{habit_id}` not registered"))?;
        Ok(compute_streak(
            &entry.index,
            entry.policy,
            today,
            self.week_start,
        ))
    }

    pub fn calendar(
        &self,
        habit_id: &str,
        reference: NaiveDate,
        window: CalendarWindow,
        today: NaiveDate,
    ) -> Result<Vec<CalendarCell>> {
        let habits = self.habits.read();
        let entry = habits
            .get(habit_id)
            .ok_or_else(|| anyhow!("habit `{habit_id}` not registered"))?;
        Ok(build_grid(
            reference,
            window,
            &entry.index,
            today,
            self.week_start,
        ))
    }

    /// Summaries for every registered habit, sorted by id.
    #[instrument(skip(self))]
    pub fn snapshot(&self, today: NaiveDate) -> ConsistencySnapshot {
        let habits = self.habits.read();
        let mut summaries: Vec<HabitSummary> = habits
            .iter()
            .map(|(habit_id, entry)| HabitSummary {
                habit_id: habit_id.clone(),
                name: entry.name.clone(),
                policy: entry.policy,
                streak: compute_streak(&entry.index, entry.policy, today, self.week_start),
                dropped_records: entry.index.invalid_dropped(),
            })
            .collect();
        summaries.sort_by(|a, b| a.habit_id.cmp(&b.habit_id));
        tracing::debug!(habits = summaries.len(), "built consistency snapshot");
        ConsistencySnapshot {
            today,
            habits: summaries,
        }
    }

    /// Decide the find-or-create-then-update write that toggles `day`.
    /// Planning against the same snapshot twice flips the flag back,
    /// so applying plan after plan round-trips to the original state.
    pub fn plan_toggle(
        &self,
        habit_id: &str,
        day: NaiveDate,
        notes: Option<String>,
    ) -> Result<TogglePlan> {
        let habits = self.habits.read();
        let entry = habits
            .get(habit_id)
            .ok_or_else(|| anyhow!("habit `{habit_id}` not registered"))?;
        let plan = match entry.index.get(day) {
            Some(existing) => {
                let mut log = existing.clone();
                log.completed = !log.completed;
                if notes.is_some() {
                    log.notes = notes;
                }
                TogglePlan::Update { log }
            }
            None => TogglePlan::Create {
                log: CompletionLog {
                    habit_id: habit_id.to_string(),
                    date: RawDate::Day(day),
                    completed: true,
                    notes,
                },
            },
        };
        Ok(plan)
    }
}
