//! Scoped timing logs for the split pipeline.
//!
//! A [`TimingGuard`] remembers when a stage started and, if telemetry is switched on and the
//! `splitter::telemetry` target is enabled at the requested level, logs the elapsed time when
//! it goes out of scope. When telemetry is off the guard is inert.

use std::{
    borrow::Cow,
    sync::atomic::{AtomicBool, AtomicU8, Ordering},
    time::{Duration, Instant},
};

use log::{Level, LevelFilter, log, log_enabled};

/// Log target used by every timing guard.
pub const TELEMETRY_TARGET: &str = "splitter::telemetry";

static ENABLED: AtomicBool = AtomicBool::new(false);
static THRESHOLD: AtomicU8 = AtomicU8::new(0);

/// Logs how long a stage took when dropped.
pub struct TimingGuard {
    stage: Cow<'static, str>,
    level: Level,
    started: Instant,
    armed: bool,
}

impl TimingGuard {
    /// Whether this guard will log on drop.
    pub fn is_active(&self) -> bool {
        self.armed
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stop the guard without logging and return the elapsed time.
    pub fn finish(mut self) -> Duration {
        self.armed = false;
        self.started.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if self.armed {
            log!(
                target: TELEMETRY_TARGET,
                self.level,
                "{} took {:.2?}",
                self.stage,
                self.started.elapsed()
            );
        }
    }
}

/// Start a guard that follows the global telemetry switch and log filter.
pub fn timing_guard(stage: impl Into<Cow<'static, str>>, level: Level) -> TimingGuard {
    timing_guard_if(stage, level, true)
}

/// Start a guard that additionally requires `enabled` to be true.
pub fn timing_guard_if(
    stage: impl Into<Cow<'static, str>>,
    level: Level,
    enabled: bool,
) -> TimingGuard {
    let armed =
        enabled && telemetry_allows(level) && log_enabled!(target: TELEMETRY_TARGET, level);
    TimingGuard {
        stage: stage.into(),
        level,
        started: Instant::now(),
        armed,
    }
}

/// Update the global telemetry switch and its maximum level.
pub fn configure(enabled: bool, level: LevelFilter) {
    ENABLED.store(enabled, Ordering::Relaxed);
    THRESHOLD.store(level as usize as u8, Ordering::Relaxed);
}

pub fn telemetry_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// The configured telemetry level; `Off` until [`configure`] is called.
pub fn telemetry_level() -> LevelFilter {
    let stored = THRESHOLD.load(Ordering::Relaxed) as usize;
    LevelFilter::iter()
        .find(|filter| *filter as usize == stored)
        .unwrap_or(LevelFilter::Off)
}

/// True when telemetry is on and `level` is within the configured threshold.
pub fn telemetry_allows(level: Level) -> bool {
    telemetry_enabled() && level <= telemetry_level()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both assertions share the global switch, so they live in one test.
    #[test]
    fn configure_controls_threshold() {
        configure(true, LevelFilter::Info);
        assert!(telemetry_enabled());
        assert_eq!(telemetry_level(), LevelFilter::Info);
        assert!(telemetry_allows(Level::Warn));
        assert!(!telemetry_allows(Level::Debug));

        configure(false, LevelFilter::Trace);
        assert!(!telemetry_allows(Level::Error));
        let guard = timing_guard("normalize", Level::Error);
        assert!(!guard.is_active());
        let _ = guard.finish();
    }
}
