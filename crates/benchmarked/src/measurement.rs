//! Timing primitive: wall-clock and CPU time for a single invocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Elapsed time of one invocation.
///
/// The core never interprets this value; it is handed to the observer as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// User CPU time consumed by the process
    #[serde(with = "duration_serde")]
    pub user: Duration,
    /// System CPU time consumed by the process
    #[serde(with = "duration_serde")]
    pub system: Duration,
    /// Wall-clock time
    #[serde(with = "duration_serde")]
    pub real: Duration,
}

impl Measurement {
    /// Run `f` and measure it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use benchmarked::Measurement;
    ///
    /// let (measurement, sum) = Measurement::measure(|| (1..=10).sum::<u32>());
    /// assert_eq!(sum, 55);
    /// println!("{measurement}");
    /// ```
    #[inline]
    pub fn measure<F, R>(f: F) -> (Measurement, R)
    where
        F: FnOnce() -> R,
    {
        let stopwatch = Stopwatch::start();
        let result = f();
        (stopwatch.stop(), result)
    }

    /// Total CPU time (user + system).
    #[inline]
    pub fn total(&self) -> Duration {
        self.user + self.system
    }

    /// Wall-clock time in milliseconds.
    #[inline]
    pub fn real_ms(&self) -> f64 {
        self.real.as_secs_f64() * 1000.0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:10.6} {:10.6} {:10.6} ({:10.6})",
            self.user.as_secs_f64(),
            self.system.as_secs_f64(),
            self.total().as_secs_f64(),
            self.real.as_secs_f64()
        )
    }
}

/// Captures a start point and turns it into a [`Measurement`] when stopped.
///
/// Unlike an RAII timer this records nothing on drop; a call that unwinds
/// simply discards its stopwatch.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
    cpu: CpuTimes,
}

impl Stopwatch {
    /// Start measuring now.
    #[inline]
    pub fn start() -> Self {
        Self {
            cpu: CpuTimes::now(),
            start: Instant::now(),
        }
    }

    /// Stop and produce the measurement.
    #[inline]
    pub fn stop(self) -> Measurement {
        let real = self.start.elapsed();
        let cpu = CpuTimes::now();
        Measurement {
            user: cpu.user.saturating_sub(self.cpu.user),
            system: cpu.system.saturating_sub(self.cpu.system),
            real,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CpuTimes {
    user: Duration,
    system: Duration,
}

impl CpuTimes {
    #[cfg(unix)]
    fn now() -> Self {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
        // SAFETY: `usage` is a valid, writable rusage buffer for the duration of the call.
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            return Self::default();
        }
        // SAFETY: getrusage returned 0, so the buffer is initialized.
        let usage = unsafe { usage.assume_init() };
        Self {
            user: timeval_to_duration(usage.ru_utime),
            system: timeval_to_duration(usage.ru_stime),
        }
    }

    #[cfg(not(unix))]
    fn now() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
fn timeval_to_duration(tv: libc::timeval) -> Duration {
    let secs = u64::try_from(tv.tv_sec).unwrap_or(0);
    let micros = u32::try_from(tv.tv_usec).unwrap_or(0);
    Duration::from_secs(secs) + Duration::from_micros(u64::from(micros))
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_nanos().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u128::deserialize(deserializer)?;
        Ok(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }
}
