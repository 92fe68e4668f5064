pub mod calendar;
pub mod datekey;
pub mod log;
pub mod policy;
pub mod streak;

pub use crate::calendar::{build_grid, CalendarCell, CalendarWindow, WindowUnit};
pub use crate::datekey::{DateKey, RawDate};
pub use crate::log::{CompletionLog, LogIndex};
pub use crate::policy::{PolicyError, StreakPolicy, WeeklyGoal};
pub use crate::streak::{compute_streak, StreakResult};

use chrono::Weekday;

/// Week rows in calendar grids and week partitions in weekly streaks
/// both start on this weekday unless the caller configures another.
/// The two consumers must always be given the same value.
pub const DEFAULT_WEEK_START: Weekday = Weekday::Sun;
