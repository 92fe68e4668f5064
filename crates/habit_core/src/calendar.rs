use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::log::LogIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    Week,
    Month,
}

/// The period a grid is generated for: the month or week containing
/// the reference date, shifted by `offset` periods (negative = past).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarWindow {
    pub unit: WindowUnit,
    pub offset: i32,
}

impl CalendarWindow {
    pub fn month(offset: i32) -> Self {
        Self {
            unit: WindowUnit::Month,
            offset,
        }
    }

    pub fn week(offset: i32) -> Self {
        Self {
            unit: WindowUnit::Week,
            offset,
        }
    }
}

/// One renderable day cell. Computed, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    /// False for lead/trail days borrowed from adjacent periods to
    /// complete a week row.
    pub in_window: bool,
    pub completed: bool,
    pub is_today: bool,
}

/// Build the day-cell grid for one window, row-major: weeks top to
/// bottom, days left to right starting at `week_start`.
///
/// The grid always covers whole week rows, so its length is a multiple
/// of seven; the row count is however many rows the period needs, not
/// a fixed six. `today` is caller-supplied, never a clock read. A
/// window shifted beyond the representable date range yields an empty
/// grid.
pub fn build_grid(
    reference: NaiveDate,
    window: CalendarWindow,
    index: &LogIndex,
    today: NaiveDate,
    week_start: Weekday,
) -> Vec<CalendarCell> {
    let bounds = match window.unit {
        WindowUnit::Month => month_bounds(reference, window.offset),
        WindowUnit::Week => week_bounds(reference, window.offset, week_start),
    };
    let Some((period_first, period_last)) = bounds else {
        return Vec::new();
    };

    let grid_start = period_first.week(week_start).first_day();
    let grid_end = period_last.week(week_start).last_day();

    let mut cells = Vec::new();
    let mut day = grid_start;
    loop {
        cells.push(CalendarCell {
            date: day,
            in_window: day >= period_first && day <= period_last,
            completed: index.is_completed(day),
            is_today: day == today,
        });
        if day == grid_end {
            break;
        }
        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
    }
    cells
}

fn month_bounds(reference: NaiveDate, offset: i32) -> Option<(NaiveDate, NaiveDate)> {
    let shifted = shift_months(reference, offset)?;
    let first = shifted.with_day(1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

fn week_bounds(
    reference: NaiveDate,
    offset: i32,
    week_start: Weekday,
) -> Option<(NaiveDate, NaiveDate)> {
    let shift = Days::new(u64::from(offset.unsigned_abs()) * 7);
    let shifted = if offset >= 0 {
        reference.checked_add_days(shift)?
    } else {
        reference.checked_sub_days(shift)?
    };
    let week = shifted.week(week_start);
    Some((week.first_day(), week.last_day()))
}

fn shift_months(reference: NaiveDate, offset: i32) -> Option<NaiveDate> {
    let months = Months::new(offset.unsigned_abs());
    if offset >= 0 {
        reference.checked_add_months(months)
    } else {
        reference.checked_sub_months(months)
    }
}
