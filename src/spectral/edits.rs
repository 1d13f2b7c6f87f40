// Individual spectrum edits, each scaled by a stage's strength mask.
// All edits keep the spectrum conjugate-symmetric and leave DC alone.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::dsp::{half_magnitudes, octave_average, rotate_bin, scale_bin, spline, StageRng};
use crate::params::{db_to_gain, gain_to_db, ApplyMode};

use super::strength::Strengths;

/// Magnitudes at or below this are treated as silent.
const MAG_FLOOR: f64 = 1e-20;

/// Lowest phase-band edge before the frequency shift, Hz.
const PHASE_BAND_BASE_HZ: f64 = 80.0;

fn multiply_bin(spectrum: &mut [Complex64], i: usize, factor: Complex64) {
    let n = spectrum.len();
    if i == 0 || i > n / 2 {
        return;
    }
    spectrum[i] *= factor;
    if i == n - i {
        spectrum[i] = Complex64::new(spectrum[i].re, 0.0);
    } else {
        spectrum[n - i] = spectrum[i].conj();
    }
}

fn set_bin_magnitude(spectrum: &mut [Complex64], i: usize, magnitude: f64) {
    let current = spectrum[i].norm();
    if current > MAG_FLOOR {
        scale_bin(spectrum, i, magnitude / current);
        return;
    }
    // no phase to keep
    let n = spectrum.len();
    spectrum[i] = Complex64::new(magnitude, 0.0);
    spectrum[n - i] = Complex64::new(magnitude, 0.0);
}

/// Multiply by another impulse's spectrum, crossfaded by strength:
/// `H[i] *= (1 - s) + s·S[i]`.
pub fn apply_source(spectrum: &mut [Complex64], strengths: &Strengths, source: &[Complex64]) {
    for i in strengths.active_range() {
        let s = strengths.get(i);
        if s == 0.0 || i >= source.len() {
            continue;
        }
        let factor = Complex64::new(1.0 - s, 0.0) + source[i] * s;
        multiply_bin(spectrum, i, factor);
    }
}

pub fn apply_gain(spectrum: &mut [Complex64], strengths: &Strengths, gain_db: f64) {
    if gain_db == 0.0 {
        return;
    }
    for i in strengths.active_range() {
        let s = strengths.get(i);
        if s > 0.0 {
            scale_bin(spectrum, i, db_to_gain(gain_db * s));
        }
    }
}

/// Pull each bin's dB deviation from its local octave average toward zero
/// (`amount < 1`) or push it further out (`amount > 1`).
pub fn apply_gain_variation(
    spectrum: &mut [Complex64],
    strengths: &Strengths,
    octaves: f64,
    amount: f64,
    mode: ApplyMode,
) {
    let mags = half_magnitudes(spectrum);
    let averages = octave_average(&mags, octaves);

    for i in strengths.active_range() {
        let s = strengths.get(i);
        if s == 0.0 || i >= mags.len() {
            continue;
        }
        let actual_db = gain_to_db(mags[i].max(MAG_FLOOR));
        let avg_db = gain_to_db(averages[i].max(MAG_FLOOR));
        let deviation = actual_db - avg_db;

        let factor = amount * s + (1.0 - s);
        let gain = mode.clamp_gain(db_to_gain(deviation * (factor - 1.0)));
        scale_bin(spectrum, i, gain);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RandomGain {
    pub filter_width: usize,
    pub seed: u64,
    pub shift: usize,
    pub amount_db: f64,
    pub skew: f64,
    pub mode: ApplyMode,
}

/// Smoothed, skewed noise in dB per bin.
pub fn apply_random_gain(spectrum: &mut [Complex64], strengths: &Strengths, params: &RandomGain) {
    if params.amount_db == 0.0 {
        return;
    }
    let half = spectrum.len() / 2;
    let width = 2 * params.filter_width + 1;

    let mut rng = StageRng::new(params.seed);
    rng.skip(params.shift);
    let noise: Vec<f64> = (0..half + width).map(|_| rng.next_bipolar()).collect();
    let norm = (width as f64).sqrt();

    for (i, window) in noise.windows(width).enumerate().take(half + 1) {
        let s = strengths.get(i);
        if s == 0.0 {
            continue;
        }
        let x = window.iter().sum::<f64>() / norm;
        let skewed = x.signum() * x.abs().powf(params.skew);
        let gain = params.mode.clamp_gain(db_to_gain(skewed * params.amount_db * s));
        scale_bin(spectrum, i, gain);
    }
}

/// Resample the magnitude curve inside the band at a skewed index.
///
/// `snapshot` holds the magnitudes of bins 0..=N/2 as they were when the
/// skew step started. Phases are kept.
pub fn apply_frequency_skew(
    spectrum: &mut [Complex64],
    strengths: &Strengths,
    snapshot: &[f64],
    scaler: f64,
    pin_to_high: bool,
) {
    if (scaler - 1.0).abs() < 1e-9 {
        return;
    }
    let f_min = strengths.f_min as f64;
    let f_max = strengths.f_max as f64;

    for i in strengths.active_range() {
        let s = strengths.get(i);
        if s == 0.0 || i >= snapshot.len() {
            continue;
        }
        let fi = i as f64;
        let k = if pin_to_high {
            (f_max - (f_max - fi) * scaler).max(f_min)
        } else {
            ((fi - f_min) * scaler + f_min).min(f_max)
        };
        let skewed = spline(snapshot, k).max(0.0);
        let current = snapshot[i];
        set_bin_magnitude(spectrum, i, current + (skewed - current) * s);
    }
}

/// Linear-phase delay of `delay_samples`, weighted by strength.
pub fn apply_delay(spectrum: &mut [Complex64], strengths: &Strengths, delay_samples: f64) {
    if delay_samples == 0.0 {
        return;
    }
    let n = spectrum.len() as f64;
    for i in strengths.active_range() {
        let s = strengths.get(i);
        if s == 0.0 {
            continue;
        }
        let fraction = delay_samples / n * s;
        rotate_bin(spectrum, i, -2.0 * PI * i as f64 * fraction);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseBands {
    pub count: usize,
    pub delay_samples: f64,
    pub freq_track: f64,
    pub seed: u64,
    pub freq_shift: f64,
}

/// Bin ranges `[start, end)` of log-spaced phase bands between
/// `80 Hz · shift` and Nyquist. The first band starts at bin 1, the last
/// one ends past Nyquist.
pub fn phase_band_ranges(count: usize, freq_shift: f64, n: usize, samplerate: f64) -> Vec<(usize, usize)> {
    let half = n / 2;
    if count == 0 || half == 0 {
        return Vec::new();
    }
    let nyquist = samplerate / 2.0;
    let base = PHASE_BAND_BASE_HZ * freq_shift;
    let octaves = (nyquist / base).log2().max(0.0);

    let mut starts: Vec<usize> = (0..count)
        .map(|k| {
            if k == 0 {
                return 1;
            }
            let edge = base * 2.0_f64.powf(k as f64 * octaves / count as f64);
            ((edge / nyquist * half as f64).round() as usize).clamp(1, half)
        })
        .collect();
    starts.push(half + 1);

    starts.windows(2).map(|w| (w[0], w[1].max(w[0]))).collect()
}

/// Delay each phase band by its own random amount.
pub fn apply_phase_bands(spectrum: &mut [Complex64], strengths: &Strengths, params: &PhaseBands, samplerate: f64) {
    if params.delay_samples == 0.0 || params.count == 0 {
        return;
    }
    let n = spectrum.len();
    let mut rng = StageRng::new(params.seed);
    let track = params.freq_track;
    let last = (params.count - 1).max(1) as f64;

    for (band, (start, end)) in phase_band_ranges(params.count, params.freq_shift, n, samplerate)
        .into_iter()
        .enumerate()
    {
        let u = rng.next_unit();
        let position = band as f64 / last;
        let weight = if track >= 0.0 {
            (1.0 - track) + track * position
        } else {
            (1.0 - track.abs()) + track.abs() * (1.0 - position)
        };
        let delay = u * params.delay_samples * weight;

        for i in start..end {
            let s = strengths.get(i);
            if s == 0.0 {
                continue;
            }
            rotate_bin(spectrum, i, -2.0 * PI * i as f64 * delay / n as f64 * s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageParams;
    use crate::dsp::{forward_fft, inverse_fft_real};

    const N: usize = 8192;
    const SR: f64 = 48000.0;

    fn unit_impulse() -> Vec<Complex64> {
        let mut x = vec![0.0; N];
        x[0] = 1.0;
        forward_fft(&x)
    }

    fn noisy_spectrum() -> Vec<Complex64> {
        let mut rng = StageRng::new(99);
        let x: Vec<f64> = (0..N)
            .map(|i| rng.next_bipolar() * (-(i as f64) / 200.0).exp())
            .collect();
        forward_fft(&x)
    }

    fn strengths(min_hz: f64, max_hz: f64) -> Strengths {
        let p = StageParams {
            min_freq_hz: min_hz,
            max_freq_hz: max_hz,
            ..StageParams::neutral()
        };
        Strengths::new(&p, N, SR)
    }

    fn assert_symmetric(spec: &[Complex64]) {
        for i in 1..N / 2 {
            assert!(
                (spec[i] - spec[N - i].conj()).norm() < 1e-9,
                "bin {i} lost conjugate symmetry"
            );
        }
        assert!(spec[N / 2].im.abs() < 1e-9);
    }

    #[test]
    fn test_gain_inside_band_only() {
        let mut spec = unit_impulse();
        let s = strengths(1000.0, 4000.0);
        apply_gain(&mut spec, &s, 6.0);
        let mags = half_magnitudes(&spec);
        assert!((mags[s.f_min] - db_to_gain(6.0)).abs() < 1e-9);
        assert!((mags[s.f_max] - db_to_gain(6.0)).abs() < 1e-9);
        assert!((mags[s.f_min - 1] - 1.0).abs() < 1e-12);
        assert!((mags[s.f_max + 1] - 1.0).abs() < 1e-12);
        assert_symmetric(&spec);
    }

    #[test]
    fn test_gain_variation_neutral_amount() {
        let original = noisy_spectrum();
        let mut spec = original.clone();
        apply_gain_variation(&mut spec, &strengths(0.0, 24000.0), 0.5, 1.0, ApplyMode::Bipolar);
        for (a, b) in spec.iter().zip(original.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn test_gain_variation_flattens() {
        let mut spec = noisy_spectrum();
        let s = strengths(0.0, 24000.0);
        let before = half_magnitudes(&spec);
        apply_gain_variation(&mut spec, &s, 1.0, 0.0, ApplyMode::Bipolar);
        let after = half_magnitudes(&spec);
        let averages = octave_average(&before, 1.0);
        for i in (100..4000).step_by(97) {
            assert!(
                (after[i] - averages[i]).abs() / averages[i] < 1e-6,
                "bin {i}: {} vs average {}",
                after[i],
                averages[i]
            );
        }
        assert_symmetric(&spec);
    }

    #[test]
    fn test_gain_variation_reduce_never_boosts() {
        let mut spec = noisy_spectrum();
        let before = half_magnitudes(&spec);
        apply_gain_variation(&mut spec, &strengths(0.0, 24000.0), 1.0, 0.0, ApplyMode::Reduce);
        let after = half_magnitudes(&spec);
        for i in 1..=N / 2 {
            assert!(after[i] <= before[i] * (1.0 + 1e-12), "bin {i} boosted");
        }
    }

    #[test]
    fn test_random_gain_deterministic() {
        let params = RandomGain {
            filter_width: 13,
            seed: 5,
            shift: 3,
            amount_db: 12.0,
            skew: 1.0,
            mode: ApplyMode::Bipolar,
        };
        let s = strengths(0.0, 24000.0);
        let mut a = unit_impulse();
        let mut b = unit_impulse();
        apply_random_gain(&mut a, &s, &params);
        apply_random_gain(&mut b, &s, &params);
        assert_eq!(a, b);
        assert!(half_magnitudes(&a).iter().skip(1).any(|&m| (m - 1.0).abs() > 1e-3));
        assert_symmetric(&a);

        let mut c = unit_impulse();
        apply_random_gain(&mut c, &s, &RandomGain { shift: 4, ..params });
        assert_ne!(a, c, "shift must change the noise");
    }

    #[test]
    fn test_random_gain_amplify_mode() {
        let params = RandomGain {
            filter_width: 4,
            seed: 1,
            shift: 0,
            amount_db: 20.0,
            skew: 1.0,
            mode: ApplyMode::Amplify,
        };
        let mut spec = unit_impulse();
        apply_random_gain(&mut spec, &strengths(0.0, 24000.0), &params);
        assert!(half_magnitudes(&spec).iter().all(|&m| m >= 1.0 - 1e-12));
    }

    #[test]
    fn test_frequency_skew_unity_is_noop() {
        let original = noisy_spectrum();
        let mut spec = original.clone();
        let snapshot = half_magnitudes(&spec);
        apply_frequency_skew(&mut spec, &strengths(0.0, 24000.0), &snapshot, 1.0, false);
        assert_eq!(spec, original);
    }

    #[test]
    fn test_frequency_skew_moves_peak() {
        // magnitude bump at bin 1000; scaler 2 reads the curve twice as fast
        let mut spec: Vec<Complex64> = vec![Complex64::new(0.1, 0.0); N];
        for i in 990..=1010 {
            spec[i] = Complex64::new(1.0, 0.0);
            spec[N - i] = Complex64::new(1.0, 0.0);
        }
        let s = strengths(0.0, 24000.0);
        let snapshot = half_magnitudes(&spec);
        apply_frequency_skew(&mut spec, &s, &snapshot, 2.0, false);
        let mags = half_magnitudes(&spec);
        // k = (i - 1) * 2 + 1 hits 1000 near i = 500
        assert!(mags[500] > 0.9, "bump should land near bin 500, got {}", mags[500]);
        assert!(mags[1000] < 0.2);
        assert_symmetric(&spec);
    }

    #[test]
    fn test_delay_shifts_impulse() {
        let mut spec = unit_impulse();
        apply_delay(&mut spec, &strengths(0.0, 24000.0), 100.0);
        let signal = inverse_fft_real(&spec);
        let peak = signal
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i);
        assert_eq!(peak, Some(100));
    }

    #[test]
    fn test_phase_band_ranges_cover_spectrum() {
        let ranges = phase_band_ranges(6, 1.0, N, SR);
        assert_eq!(ranges.len(), 6);
        assert_eq!(ranges[0].0, 1);
        assert_eq!(ranges[5].1, N / 2 + 1);
        for w in ranges.windows(2) {
            assert_eq!(w[0].1, w[1].0, "bands must be contiguous");
        }
        // 80 Hz · 2^(log2(300)/6) ~ 207 Hz
        assert_eq!(ranges[1].0, 35);
    }

    #[test]
    fn test_phase_bands_keep_magnitude() {
        let mut spec = noisy_spectrum();
        let before = half_magnitudes(&spec);
        let params = PhaseBands {
            count: 5,
            delay_samples: 400.0,
            freq_track: 0.5,
            seed: 11,
            freq_shift: 1.0,
        };
        apply_phase_bands(&mut spec, &strengths(0.0, 24000.0), &params, SR);
        let after = half_magnitudes(&spec);
        for i in 1..N / 2 {
            assert!((before[i] - after[i]).abs() < 1e-9);
        }
        assert_symmetric(&spec);
    }

    #[test]
    fn test_apply_source_full_strength_multiplies() {
        let mut spec = unit_impulse();
        let mut src = vec![0.0; N];
        src[3] = 1.0;
        let source = forward_fft(&src);
        apply_source(&mut spec, &strengths(0.0, 24000.0), &source);
        let signal = inverse_fft_real(&spec);
        assert!((signal[3] - 1.0).abs() < 1e-9, "unit impulse times delayed source, got {}", signal[3]);
        assert_symmetric(&spec);
    }
}
