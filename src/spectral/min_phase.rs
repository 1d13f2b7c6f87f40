use num_complex::Complex64;
use rustfft::FftPlanner;

/// Floor applied before taking the log magnitude.
const LOG_FLOOR: f64 = 1e-20;

/// Replace the whole spectrum with the minimum-phase spectrum of the same
/// magnitude.
///
/// Algorithm (cepstral folding / Hilbert transform):
/// 1. ln|H| for bins 0..=N/2, mirrored to a real, even N-point signal
/// 2. FFT
/// 3. Hilbert window: ×1 for DC and Nyquist, ×2 for positive, ×0 for negative
/// 4. IFFT, scaled by 1/N
/// 5. phase = -imaginary part; H = |H| · e^{jφ}, mirrored as conjugates
pub fn minimum_phase(spectrum: &mut [Complex64]) {
    let n_fft = spectrum.len();
    if n_fft < 2 {
        return;
    }
    let n_bins = n_fft / 2 + 1;

    let ln_mag: Vec<f64> = spectrum
        .iter()
        .take(n_bins)
        .map(|c| c.norm().max(LOG_FLOOR).ln())
        .collect();

    let mut cepstrum: Vec<Complex64> = Vec::with_capacity(n_fft);
    cepstrum.extend(ln_mag.iter().map(|&v| Complex64::new(v, 0.0)));
    for i in n_bins..n_fft {
        cepstrum.push(Complex64::new(ln_mag[n_fft - i], 0.0));
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n_fft);
    fft.process(&mut cepstrum);

    for c in cepstrum.iter_mut().take(n_fft / 2).skip(1) {
        *c *= 2.0;
    }
    for c in cepstrum.iter_mut().skip(n_fft / 2 + 1) {
        *c = Complex64::new(0.0, 0.0);
    }

    let ifft = planner.plan_fft_inverse(n_fft);
    ifft.process(&mut cepstrum);
    let norm = 1.0 / n_fft as f64;

    for i in 0..n_bins {
        let phase = -cepstrum[i].im * norm;
        spectrum[i] = Complex64::from_polar(ln_mag[i].exp(), phase);
    }
    // DC and Nyquist of a real signal are real
    spectrum[0] = Complex64::new(spectrum[0].re, 0.0);
    spectrum[n_fft / 2] = Complex64::new(spectrum[n_fft / 2].re, 0.0);
    for i in n_bins..n_fft {
        spectrum[i] = spectrum[n_fft - i].conj();
    }
}
