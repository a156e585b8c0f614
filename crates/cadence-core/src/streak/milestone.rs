//! Streak milestones and display formatting.

use serde::{Deserialize, Serialize};

/// Streak lengths that unlock an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakMilestone {
    Week,
    Month,
    Hundred,
    Year,
}

impl StreakMilestone {
    pub const ALL: [StreakMilestone; 4] = [
        StreakMilestone::Week,
        StreakMilestone::Month,
        StreakMilestone::Hundred,
        StreakMilestone::Year,
    ];

    pub fn days(&self) -> u32 {
        match self {
            StreakMilestone::Week => 7,
            StreakMilestone::Month => 30,
            StreakMilestone::Hundred => 100,
            StreakMilestone::Year => 365,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StreakMilestone::Week => "One week",
            StreakMilestone::Month => "One month",
            StreakMilestone::Hundred => "100 days",
            StreakMilestone::Year => "One year",
        }
    }
}

/// The milestone `streak` lands on exactly, if any.
///
/// Only exact hits count, so a milestone fires on the day it is reached
/// and not again while the streak keeps growing.
pub fn milestone_reached(streak: u32) -> Option<StreakMilestone> {
    StreakMilestone::ALL.into_iter().find(|m| m.days() == streak)
}

/// "0 days", "1 day", "12 days".
pub fn format_streak(count: u32) -> String {
    if count == 1 {
        "1 day".to_string()
    } else {
        format!("{count} days")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestones_fire_on_exact_values_only() {
        assert_eq!(milestone_reached(7), Some(StreakMilestone::Week));
        assert_eq!(milestone_reached(30), Some(StreakMilestone::Month));
        assert_eq!(milestone_reached(100), Some(StreakMilestone::Hundred));
        assert_eq!(milestone_reached(365), Some(StreakMilestone::Year));
        assert_eq!(milestone_reached(8), None);
        assert_eq!(milestone_reached(0), None);
    }

    #[test]
    fn format_streak_pluralizes() {
        assert_eq!(format_streak(0), "0 days");
        assert_eq!(format_streak(1), "1 day");
        assert_eq!(format_streak(42), "42 days");
    }
}
