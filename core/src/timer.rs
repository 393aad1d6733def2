//! Scoped elapsed-time measurement.
//!
//! A [`ScopedTimer`] is opened with a label, wraps a block of work and writes
//! exactly one `"{secs:.3}s {label}"` line when it closes. Closing happens on
//! [`ScopedTimer::end`] or, if the timer is dropped first (early return, `?`,
//! panic unwind), from `Drop`.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::bail;
use chrono::{DateTime, Local};

/// Which clock a timer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// Wall-clock time from a monotonic source. Counts time blocked on I/O.
    #[default]
    Monotonic,
    /// CPU time consumed by the whole process. Undercounts I/O-bound work.
    ProcessCpu,
}

impl ClockSource {
    pub fn name(self) -> &'static str {
        match self {
            ClockSource::Monotonic => "monotonic",
            ClockSource::ProcessCpu => "cpu",
        }
    }

    fn read(self) -> ClockReading {
        match self {
            ClockSource::Monotonic => ClockReading::Wall(Instant::now()),
            ClockSource::ProcessCpu => match process_cpu_time() {
                Some(cpu) => ClockReading::Cpu(cpu),
                None => {
                    log::warn!("Process CPU clock unavailable, using the monotonic clock");
                    ClockReading::Wall(Instant::now())
                }
            },
        }
    }
}

impl fmt::Display for ClockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClockSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" | "wall" => Ok(ClockSource::Monotonic),
            "cpu" | "process-cpu" => Ok(ClockSource::ProcessCpu),
            other => bail!("unknown clock source '{other}' (expected 'monotonic' or 'cpu')"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ClockReading {
    Wall(Instant),
    Cpu(Duration),
}

impl ClockReading {
    fn elapsed(&self) -> Duration {
        match self {
            ClockReading::Wall(start) => start.elapsed(),
            ClockReading::Cpu(start) => process_cpu_time()
                .map(|now| now.saturating_sub(*start))
                .unwrap_or_default(),
        }
    }
}

#[cfg(unix)]
fn process_cpu_time() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return None;
    }
    Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

#[cfg(not(unix))]
fn process_cpu_time() -> Option<Duration> {
    None
}

/// One labelled measurement. Open until its timer closes, then immutable.
#[derive(Debug, Clone)]
pub struct Measurement {
    label: String,
    started_at: DateTime<Local>,
    elapsed: Option<Duration>,
}

impl Measurement {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wall-clock timestamp taken when the timer was opened.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// `None` while the measurement is still open.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.map_or(0.0, |d| d.as_secs_f64())
    }

    pub fn is_closed(&self) -> bool {
        self.elapsed.is_some()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s {}", self.elapsed_seconds(), self.label)
    }
}

/// An open measurement. Reports itself exactly once when closed.
pub struct ScopedTimer {
    measurement: Measurement,
    clock: ClockSource,
    start: ClockReading,
    sink: Box<dyn Write>,
    closed: bool,
}

impl ScopedTimer {
    /// Open a monotonic timer that reports to stdout.
    pub fn begin(label: impl Into<String>) -> Self {
        Self::begin_on(label, ClockSource::default())
    }

    /// Open a timer on the given clock that reports to stdout.
    pub fn begin_on(label: impl Into<String>, clock: ClockSource) -> Self {
        Self::begin_with(label, clock, Box::new(io::stdout()))
    }

    pub fn begin_with(label: impl Into<String>, clock: ClockSource, sink: Box<dyn Write>) -> Self {
        let label = label.into();
        debug_assert!(!label.is_empty(), "timer label must not be empty");

        let started_at = Local::now();
        let start = clock.read();
        Self {
            measurement: Measurement {
                label,
                started_at,
                elapsed: None,
            },
            clock,
            start,
            sink,
            closed: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.measurement.label
    }

    pub fn clock(&self) -> ClockSource {
        self.clock
    }

    /// Close the measurement, write the report line and return the result.
    pub fn end(mut self) -> Measurement {
        self.close();
        self.measurement.clone()
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.measurement.elapsed = Some(self.start.elapsed());

        // A broken sink must not turn a finished measurement into a new failure.
        let _ = writeln!(self.sink, "{}", self.measurement);
        let _ = self.sink.flush();

        log::debug!(
            "Timer '{}' ({} clock, started {}) closed after {:?}",
            self.measurement.label,
            self.clock,
            self.measurement.started_at.format("%H:%M:%S%.3f"),
            self.measurement.elapsed.unwrap_or_default()
        );
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Run `work` inside `timer` and return its value together with the closed
/// measurement. If `work` panics the timer still reports while unwinding.
pub fn measure<T>(timer: ScopedTimer, work: impl FnOnce() -> T) -> (T, Measurement) {
    let value = work();
    (value, timer.end())
}

/// Time `work` on the monotonic clock, reporting to stdout.
///
/// The block's value, including an `Err`, is handed back unchanged after the
/// report line has been written.
pub fn timed<T>(label: impl Into<String>, work: impl FnOnce() -> T) -> T {
    measure(ScopedTimer::begin(label), work).0
}
