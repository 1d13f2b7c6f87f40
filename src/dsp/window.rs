use std::f64::consts::PI;

use crate::params::{db_to_gain, WindowMethod};

/// Below this fraction the tail window is treated as absent.
const MIN_WINDOW_LENGTH: f64 = 0.002;

/// Tail-window envelope at sample `i` of an `n`-sample signal.
///
/// `window_length` is the fraction of the signal (at its end) covered by the
/// fade. Returns 1.0 before the fade starts and 0.0 at or past `n`.
pub fn get_window(i: usize, n: usize, window_length: f64, method: WindowMethod) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let pos = i as f64 / n as f64;
    let start = 1.0 - window_length;
    if pos < start {
        return 1.0;
    }
    if i >= n {
        return 0.0;
    }
    if window_length < MIN_WINDOW_LENGTH {
        return 1.0;
    }

    let x = ((pos - start) / window_length).clamp(0.0, 1.0);
    match method {
        WindowMethod::Truncate => 0.0,
        WindowMethod::Linear => 1.0 - x,
        WindowMethod::Logarithmic => db_to_gain(-60.0 * x),
        WindowMethod::Cosine => ((x * PI).cos() + 1.0) / 2.0,
    }
}
