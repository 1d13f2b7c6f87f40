/// Average of `values` over a constant-octave window centred on each bin.
///
/// Bin `i` averages the bins whose frequency lies in `[i/k, i*k]` with
/// `k = 2^octaves`. Bin 0 (DC) is passed through. Prefix sums keep the
/// cost linear in the number of bins.
pub fn octave_average(values: &[f64], octaves: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let prefix = prefix_sums(values);
    let k = 2.0_f64.powf(octaves.max(0.0));

    (0..n)
        .map(|i| {
            if i == 0 {
                return values[0];
            }
            let lo = ((i as f64 / k).round() as usize).clamp(1, i);
            let hi = ((i as f64 * k).round() as usize).clamp(i, n - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi - lo + 1) as f64
        })
        .collect()
}

/// Average of `values` over `±round(octaves·i/2)` bins around each bin `i`,
/// restricted to `0 < idx < len`. Bin 0 is passed through.
pub fn linear_bin_average(values: &[f64], octaves: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let prefix = prefix_sums(values);

    (0..n)
        .map(|i| {
            if i == 0 {
                return values[0];
            }
            let half = (octaves.max(0.0) * i as f64 / 2.0).round() as usize;
            let lo = i.saturating_sub(half).max(1);
            let hi = (i + half).min(n - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi - lo + 1) as f64
        })
        .collect()
}

fn prefix_sums(values: &[f64]) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &v in values {
        acc += v;
        prefix.push(acc);
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_identity() {
        // Flat data should remain flat after smoothing
        let flat = vec![0.8; 4097];
        for s in octave_average(&flat, 1.0).iter().chain(linear_bin_average(&flat, 1.0).iter()) {
            assert!((s - 0.8).abs() < 1e-10);
        }
    }

    #[test]
    fn test_octave_window_grows_with_frequency() {
        // single spike: low bins never see it, bins within an octave do
        let mut values = vec![0.0; 1025];
        values[512] = 1.0;
        let avg = octave_average(&values, 1.0);
        assert_eq!(avg[100], 0.0);
        assert!(avg[400] > 0.0);
        assert!(avg[700] > 0.0);
        assert!(avg[512] < 1.0);
    }

    #[test]
    fn test_octave_window_edges() {
        // one octave: bin 100 averages bins 50..=200
        let mut values = vec![0.0; 1025];
        values[50] = 1.0;
        values[200] = 1.0;
        let avg = octave_average(&values, 1.0);
        assert!((avg[100] - 2.0 / 151.0).abs() < 1e-12, "got {}", avg[100]);

        values[49] = 1.0;
        values[201] = 1.0;
        let avg = octave_average(&values, 1.0);
        assert!((avg[100] - 2.0 / 151.0).abs() < 1e-12, "bins outside the octave leaked in");
    }

    #[test]
    fn test_zero_width_is_identity() {
        let values: Vec<f64> = (0..64).map(|i| (i as f64).sin()).collect();
        let a = octave_average(&values, 0.0);
        let b = linear_bin_average(&values, 0.0);
        for i in 0..64 {
            assert!((a[i] - values[i]).abs() < 1e-12);
            assert!((b[i] - values[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_average_skips_dc() {
        let mut values = vec![1.0; 33];
        values[0] = 100.0;
        let avg = linear_bin_average(&values, 2.0);
        assert_eq!(avg[0], 100.0);
        assert!((avg[1] - 1.0).abs() < 1e-12, "DC leaked into bin 1: {}", avg[1]);
    }
}
