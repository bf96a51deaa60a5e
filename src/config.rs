//! Configuration types.

use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{IntervalSetting, IntervalSource};

/// Material blue 700 — the accent carried on every composed alert.
pub const DEFAULT_ACCENT: u32 = 0x1976D2;

/// Sync engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Poll interval used when the user configured nothing.
    pub baseline_interval: Duration,
    /// Smallest periodic granularity the platform scheduler honors.
    /// Desired intervals below this become one-shot triggers.
    pub platform_min_period: Option<Duration>,
    /// Hard ceiling on unread items enriched per run, which is also the
    /// concurrent fetch cap.
    pub fanout_limit: usize,
    /// Per-comment fetch timeout. A timed-out fetch counts as that
    /// item's failure only.
    pub comment_fetch_timeout: Duration,
    /// Accent color for composed alerts (0xRRGGBB).
    pub accent_color: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            baseline_interval: Duration::from_secs(30 * 60),
            platform_min_period: None,
            fanout_limit: 10,
            comment_fetch_timeout: Duration::from_secs(20),
            accent_color: DEFAULT_ACCENT,
        }
    }
}

/// Interval storage backed by an environment variable.
///
/// `OCTOWATCH_INTERVAL_SECS`: unset or `0` → baseline, `-1` → disabled,
/// any other positive integer → poll every that many seconds.
#[derive(Debug, Clone)]
pub struct EnvIntervals {
    var: String,
}

impl EnvIntervals {
    pub fn new() -> Self {
        Self {
            var: "OCTOWATCH_INTERVAL_SECS".to_string(),
        }
    }

    /// Use a different variable name (tests).
    pub fn from_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    fn parse(raw: &str) -> IntervalSetting {
        match raw.trim().parse::<i64>() {
            Ok(-1) => IntervalSetting::Disabled,
            Ok(secs) if secs > 0 => IntervalSetting::Every(Duration::from_secs(secs as u64)),
            _ => IntervalSetting::Unset,
        }
    }
}

impl Default for EnvIntervals {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntervalSource for EnvIntervals {
    async fn configured_interval(&self) -> IntervalSetting {
        match std::env::var(&self.var) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => IntervalSetting::Unset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_positive_seconds() {
        assert_eq!(
            EnvIntervals::parse("600"),
            IntervalSetting::Every(Duration::from_secs(600))
        );
    }

    #[test]
    fn parse_disabled_sentinel() {
        assert_eq!(EnvIntervals::parse("-1"), IntervalSetting::Disabled);
    }

    #[test]
    fn parse_zero_and_garbage_fall_back_to_unset() {
        assert_eq!(EnvIntervals::parse("0"), IntervalSetting::Unset);
        assert_eq!(EnvIntervals::parse("soon"), IntervalSetting::Unset);
        assert_eq!(EnvIntervals::parse("-5"), IntervalSetting::Unset);
    }
}
