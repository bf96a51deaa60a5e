//! Interval policy — turns the user-configured poll interval into a
//! concrete schedule request.

use std::time::Duration;

use crate::config::SyncConfig;
use crate::ports::{IntervalSetting, Trigger};

/// What the job should ask the scheduler for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleRequest {
    /// Install (or keep) a trigger.
    Set(Trigger),
    /// Drop the recurring trigger entirely.
    Cancel,
}

/// Computes the next poll trigger from user configuration and platform
/// minimums.
#[derive(Debug, Clone)]
pub struct IntervalPolicy {
    baseline: Duration,
    platform_min_period: Option<Duration>,
}

impl IntervalPolicy {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            baseline: config.baseline_interval,
            platform_min_period: config.platform_min_period,
        }
    }

    /// Next schedule request for the given configured interval.
    ///
    /// Unset and zero durations fall back to the baseline. A desired
    /// interval below the platform's periodic minimum becomes a one-shot
    /// trigger (the job re-schedules on each completion) instead of
    /// being silently coalesced up to the minimum.
    pub fn next_schedule(&self, configured: IntervalSetting) -> ScheduleRequest {
        let desired = match configured {
            IntervalSetting::Disabled => return ScheduleRequest::Cancel,
            IntervalSetting::Unset => self.baseline,
            IntervalSetting::Every(d) if d.is_zero() => self.baseline,
            IntervalSetting::Every(d) => d,
        };

        match self.platform_min_period {
            Some(min) if desired < min => ScheduleRequest::Set(Trigger::OneShot(desired)),
            _ => ScheduleRequest::Set(Trigger::Periodic(desired)),
        }
    }
}
