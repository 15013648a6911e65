//! Wall clock timing and elapsed-time formatting for the drivers.

use std::time::{Duration, Instant};

/// `seconds.nanoseconds`, nanoseconds zero padded to nine digits.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{}.{:09}", elapsed.as_secs(), elapsed.subsec_nanos())
}

/// Wall clock timer around one engine call.
#[derive(Copy, Clone, Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time `f`, returning its result with the elapsed time.
    pub fn time<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
        let watch = Stopwatch::start();
        let result = f();
        (result, watch.elapsed())
    }
}

/// Median of a set of measurements, `None` when there are none.
pub fn median(samples: &[Duration]) -> Option<Duration> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2)
    } else {
        Some(sorted[mid])
    }
}
