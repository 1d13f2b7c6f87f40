pub mod filters;
mod interpolation;
mod rng;
mod smoothing;
mod window;

use num_complex::Complex64;
use rustfft::FftPlanner;

pub use interpolation::{resample_spline, spline};
pub use rng::StageRng;
pub use smoothing::{linear_bin_average, octave_average};
pub use window::get_window;

/// Generate a logarithmically-spaced frequency grid.
pub fn generate_log_freq_grid(n: usize, f_min: f64, f_max: f64) -> Vec<f64> {
    if n < 2 {
        return vec![f_min];
    }
    let log_min = f_min.ln();
    let log_max = f_max.ln();
    (0..n)
        .map(|i| (log_min + (log_max - log_min) * i as f64 / (n - 1) as f64).exp())
        .collect()
}

// ---------------------------------------------------------------------------
// Spectrum helpers (full N-point spectra of real signals)
// ---------------------------------------------------------------------------

/// Forward FFT of a real signal.
pub fn forward_fft(signal: &[f64]) -> Vec<Complex64> {
    let mut buf: Vec<Complex64> = signal.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    if buf.is_empty() {
        return buf;
    }
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buf.len());
    fft.process(&mut buf);
    buf
}

/// Inverse FFT, normalized by 1/N, real part only.
pub fn inverse_fft_real(spectrum: &[Complex64]) -> Vec<f64> {
    let n = spectrum.len();
    if n == 0 {
        return Vec::new();
    }
    let mut buf = spectrum.to_vec();
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    ifft.process(&mut buf);

    let norm = 1.0 / n as f64;
    buf.iter().map(|c| c.re * norm).collect()
}

/// Scale the magnitude of bin `i` and its mirror. Nyquist is scaled once.
pub fn scale_bin(spectrum: &mut [Complex64], i: usize, gain: f64) {
    let n = spectrum.len();
    if i == 0 || i > n / 2 {
        return;
    }
    spectrum[i] *= gain;
    if i != n - i {
        spectrum[n - i] *= gain;
    }
}

/// Rotate the phase of bin `i` by `phase` radians; the mirror is set to the
/// conjugate and the Nyquist bin is kept real.
pub fn rotate_bin(spectrum: &mut [Complex64], i: usize, phase: f64) {
    let n = spectrum.len();
    if i == 0 || i > n / 2 {
        return;
    }
    let rotated = spectrum[i] * Complex64::from_polar(1.0, phase);
    if i == n - i {
        spectrum[i] = Complex64::new(rotated.re, 0.0);
    } else {
        spectrum[i] = rotated;
        spectrum[n - i] = rotated.conj();
    }
}

/// Magnitudes of bins 0..=N/2.
pub fn half_magnitudes(spectrum: &[Complex64]) -> Vec<f64> {
    let half = spectrum.len() / 2;
    spectrum.iter().take(half + 1).map(|c| c.norm()).collect()
}
