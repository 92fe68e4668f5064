use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::log::LogIndex;
use crate::policy::{StreakPolicy, WeeklyGoal};

/// Computed streak statistics. Never persisted; recomputed from the
/// log snapshot on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    /// Historical maximum run, independent of `today`. A broken past
    /// run can exceed the current one.
    pub longest_streak: u32,
    pub total_completions: u32,
    pub last_completed: Option<NaiveDate>,
}

/// Derive streak statistics for one habit.
///
/// `today` is the viewer's local calendar day, supplied by the caller;
/// the engine never reads a clock. An in-progress period carries anchor
/// tolerance: a day (or week) that has not fully elapsed does not break
/// the streak merely by being incomplete so far.
pub fn compute_streak(
    index: &LogIndex,
    policy: StreakPolicy,
    today: NaiveDate,
    week_start: Weekday,
) -> StreakResult {
    let (current_streak, longest_streak) = match policy {
        StreakPolicy::Daily => (daily_current(index, today), daily_longest(index)),
        StreakPolicy::Weekly { goal } => weekly_runs(index, today, goal, week_start),
    };
    StreakResult {
        current_streak,
        longest_streak,
        total_completions: index.total_completions(),
        last_completed: index.last_completed(),
    }
}

fn daily_current(index: &LogIndex, today: NaiveDate) -> u32 {
    let anchor = if index.is_completed(today) {
        Some(today)
    } else {
        today
            .pred_opt()
            .filter(|yesterday| index.is_completed(*yesterday))
    };
    let Some(mut day) = anchor else {
        return 0;
    };

    let mut count = 1u32;
    while let Some(previous) = day.pred_opt() {
        if !index.is_completed(previous) {
            break;
        }
        count += 1;
        day = previous;
    }
    count
}

fn daily_longest(index: &LogIndex) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for day in index.completed_days() {
        run = match previous {
            Some(prior) if prior.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

fn week_of(day: NaiveDate, week_start: Weekday) -> NaiveDate {
    day.week(week_start).first_day()
}

/// Current and longest runs of qualifying weeks. Weeks are keyed by
/// their first day; a week qualifies when its completed-day count
/// meets the goal.
fn weekly_runs(
    index: &LogIndex,
    today: NaiveDate,
    goal: WeeklyGoal,
    week_start: Weekday,
) -> (u32, u32) {
    let mut per_week: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for day in index.completed_days() {
        *per_week.entry(week_of(day, week_start)).or_insert(0) += 1;
    }
    let qualifying: BTreeSet<NaiveDate> = per_week
        .into_iter()
        .filter(|(_, count)| *count >= u32::from(goal.get()))
        .map(|(week, _)| week)
        .collect();

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for week in &qualifying {
        run = match previous {
            Some(prior) if prior.checked_add_days(Days::new(7)) == Some(*week) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*week);
    }

    let this_week = week_of(today, week_start);
    let anchor = if qualifying.contains(&this_week) {
        Some(this_week)
    } else {
        this_week
            .checked_sub_days(Days::new(7))
            .filter(|prior| qualifying.contains(prior))
    };
    let current = match anchor {
        None => 0,
        Some(mut week) => {
            let mut count = 1u32;
            while let Some(prior) = week.checked_sub_days(Days::new(7)) {
                if !qualifying.contains(&prior) {
                    break;
                }
                count += 1;
                week = prior;
            }
            count
        }
    };

    (current, longest)
}
