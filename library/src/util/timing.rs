//! Scoped wall-clock timing reported through the `log` facade.

use std::borrow::Cow;
use std::time::Instant;

use log::Level;

/// Logs how long it lived when dropped.
///
/// A timer created while its level is disabled records nothing.
pub struct ScopedTimer {
    label: Option<Cow<'static, str>>,
    level: Level,
    start: Instant,
}

impl ScopedTimer {
    fn with_level(label: impl Into<Cow<'static, str>>, level: Level) -> Self {
        let label = log::log_enabled!(level).then(|| label.into());
        Self {
            label,
            level,
            start: Instant::now(),
        }
    }

    pub fn debug(label: impl Into<Cow<'static, str>>) -> Self {
        Self::with_level(label, Level::Debug)
    }

    /// Debug timer whose label is only built when debug logging is on.
    pub fn debug_lazy<F>(label_gen: F) -> Self
    where
        F: FnOnce() -> String,
    {
        let label = log::log_enabled!(Level::Debug).then(|| Cow::Owned(label_gen()));
        Self {
            label,
            level: Level::Debug,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        if let Some(label) = &self.label {
            let micros = self.start.elapsed().as_micros();
            log::log!(self.level, "{} took {}.{:03} ms", label, micros / 1000, micros % 1000);
        }
    }
}

/// Run `f` under a debug-level timer.
pub fn measure_debug<T, F>(label: impl Into<Cow<'static, str>>, f: F) -> T
where
    F: FnOnce() -> T,
{
    let _timer = ScopedTimer::debug(label);
    f()
}
