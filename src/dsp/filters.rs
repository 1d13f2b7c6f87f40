// Time-domain filters: RBJ biquads and a zero-delay-feedback one-pole

use std::f64::consts::PI;

use num_complex::Complex64;

/// Butterworth Q for the 2-pole cuts.
pub const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Keep cutoffs strictly inside (0, Nyquist).
fn clamp_cutoff(fc: f64, sample_rate: f64) -> f64 {
    fc.clamp(1.0, 0.499 * sample_rate)
}

/// Second-order IIR section (transposed direct form II), coefficients
/// normalized by a0.
#[derive(Debug, Clone, PartialEq)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn from_raw(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    pub fn low_pass(sample_rate: f64, fc: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * clamp_cutoff(fc, sample_rate) / sample_rate;
        let cos_w = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        Self::from_raw(
            (1.0 - cos_w) / 2.0,
            1.0 - cos_w,
            (1.0 - cos_w) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    pub fn high_pass(sample_rate: f64, fc: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * clamp_cutoff(fc, sample_rate) / sample_rate;
        let cos_w = w0.cos();
        let alpha = w0.sin() / (2.0 * q);
        Self::from_raw(
            (1.0 + cos_w) / 2.0,
            -(1.0 + cos_w),
            (1.0 + cos_w) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    /// Peaking EQ. 0 dB gain yields an exact pass-through.
    pub fn peak(sample_rate: f64, fc: f64, q: f64, gain_db: f64) -> Self {
        let w0 = 2.0 * PI * clamp_cutoff(fc, sample_rate) / sample_rate;
        let a_lin = 10.0_f64.powf(gain_db / 40.0);
        let alpha = w0.sin() / (2.0 * q.max(1e-6));
        let cos_w = w0.cos();
        Self::from_raw(
            1.0 + alpha * a_lin,
            -2.0 * cos_w,
            1.0 - alpha * a_lin,
            1.0 + alpha / a_lin,
            -2.0 * cos_w,
            1.0 - alpha / a_lin,
        )
    }

    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Complex response at `freq` Hz. Does not touch the filter state.
    pub fn response(&self, freq: f64, sample_rate: f64) -> Complex64 {
        let w = 2.0 * PI * freq / sample_rate;
        let z1 = Complex64::from_polar(1.0, -w);
        let z2 = Complex64::from_polar(1.0, -2.0 * w);
        let num = self.b0 + z1 * self.b1 + z2 * self.b2;
        let den = 1.0 + z1 * self.a1 + z2 * self.a2;
        if den.norm_sqr() < 1e-30 {
            return Complex64::new(1.0, 0.0);
        }
        num / den
    }
}

/// Topology-preserving-transform one-pole; one tick yields both the
/// low-pass and the complementary high-pass output.
#[derive(Debug, Clone, PartialEq)]
pub struct OnePole {
    g: f64,
    state: f64,
}

impl OnePole {
    pub fn new(sample_rate: f64, fc: f64) -> Self {
        let g = (PI * clamp_cutoff(fc, sample_rate) / sample_rate).tan();
        Self {
            g: g / (1.0 + g),
            state: 0.0,
        }
    }

    /// Returns `(low_pass, high_pass)`.
    pub fn tick(&mut self, x: f64) -> (f64, f64) {
        let v = (x - self.state) * self.g;
        let lp = v + self.state;
        self.state = lp + v;
        (lp, x - lp)
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    fn mag_db(c: Complex64) -> f64 {
        20.0 * c.norm().log10()
    }

    #[test]
    fn test_peak_at_center_frequency() {
        let bq = Biquad::peak(SR, 1000.0, 4.0, 6.0);
        let result = mag_db(bq.response(1000.0, SR));
        assert!((result - 6.0).abs() < 0.01, "At center freq, gain should be 6 dB, got {result}");
    }

    #[test]
    fn test_peak_zero_gain_is_identity() {
        let mut bq = Biquad::peak(SR, 700.0, 1.0, 0.0);
        let input = [1.0, -0.5, 0.25, 0.0, 0.3];
        for &x in &input {
            assert!((bq.process(x) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_low_pass_dc_gain() {
        let bq = Biquad::low_pass(SR, 2000.0, BUTTERWORTH_Q);
        assert!((bq.response(0.0, SR).norm() - 1.0).abs() < 1e-9);
        let at_fc = mag_db(bq.response(2000.0, SR));
        assert!((at_fc + 3.01).abs() < 0.05, "Butterworth -3 dB point, got {at_fc}");
    }

    #[test]
    fn test_high_pass_blocks_dc() {
        let mut bq = Biquad::high_pass(SR, 200.0, BUTTERWORTH_Q);
        let mut last = 1.0;
        for _ in 0..20000 {
            last = bq.process(1.0);
        }
        assert!(last.abs() < 1e-6, "HP step response should decay, got {last}");
    }

    #[test]
    fn test_one_pole_complementary() {
        let mut f = OnePole::new(SR, 1000.0);
        for i in 0..100 {
            let x = (i as f64 * 0.37).sin();
            let (lp, hp) = f.tick(x);
            assert!((lp + hp - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_one_pole_dc_passes_low() {
        let mut f = OnePole::new(SR, 500.0);
        let mut out = (0.0, 0.0);
        for _ in 0..10000 {
            out = f.tick(1.0);
        }
        assert!((out.0 - 1.0).abs() < 1e-6);
        assert!(out.1.abs() < 1e-6);
    }

    #[test]
    fn test_response_does_not_mutate() {
        let mut bq = Biquad::peak(SR, 1000.0, 2.0, 3.0);
        bq.process(1.0);
        let before = bq.clone();
        let _ = bq.response(500.0, SR);
        assert_eq!(bq, before);
    }
}
