use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("weekly goal must be between 1 and 7 days, got {0}")]
    GoalOutOfRange(u8),
}

/// Streak cadence configured per habit.
///
/// The variant set is closed: a configuration record carrying an
/// unknown kind is rejected when it is deserialized, before any
/// computation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StreakPolicy {
    Daily,
    Weekly { goal: WeeklyGoal },
}

impl StreakPolicy {
    pub fn weekly(goal: u8) -> Result<Self, PolicyError> {
        Ok(Self::Weekly {
            goal: WeeklyGoal::new(goal)?,
        })
    }
}

/// Number of completed days a week needs before it counts toward a
/// weekly streak. Always 1..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeeklyGoal(u8);

impl WeeklyGoal {
    pub fn new(goal: u8) -> Result<Self, PolicyError> {
        if (1..=7).contains(&goal) {
            Ok(Self(goal))
        } else {
            Err(PolicyError::GoalOutOfRange(goal))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for WeeklyGoal {
    type Error = PolicyError;

    fn try_from(goal: u8) -> Result<Self, Self::Error> {
        Self::new(goal)
    }
}

impl From<WeeklyGoal> for u8 {
    fn from(goal: WeeklyGoal) -> Self {
        goal.0
    }
}

/// Display fallback for habits configured before weekly goals existed.
/// Engine paths always use the policy's own value, never this.
impl Default for WeeklyGoal {
    fn default() -> Self {
        Self(5)
    }
}
