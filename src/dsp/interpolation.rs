/// Catmull-Rom cubic spline of `data` at fractional index `idx`.
///
/// Neighbours outside the slice are clamped to the edge samples.
pub fn spline(data: &[f64], idx: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let last = data.len() as i64 - 1;
    let idx = idx.max(0.0);
    let i = idx.floor() as i64;
    let t = idx - i as f64;
    let at = |k: i64| data[k.clamp(0, last) as usize];

    let p0 = at(i - 1);
    let p1 = at(i);
    let p2 = at(i + 1);
    let p3 = at(i + 2);

    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    ((a * t + b) * t + c) * t + p1
}

/// Resample `data` from `src_rate` to `dst_rate` by spline interpolation.
///
/// Two zero guard samples are appended; the read index advances by
/// `src_rate / dst_rate` and stops once it reaches the original length.
pub fn resample_spline(data: &[f64], src_rate: f64, dst_rate: f64) -> Vec<f64> {
    if data.is_empty() || src_rate <= 0.0 || dst_rate <= 0.0 || src_rate == dst_rate {
        return data.to_vec();
    }

    let mut padded = Vec::with_capacity(data.len() + 2);
    padded.extend_from_slice(data);
    padded.extend_from_slice(&[0.0, 0.0]);

    let step = src_rate / dst_rate;
    let end = (padded.len() - 2) as f64;
    let mut out = Vec::with_capacity((data.len() as f64 / step).ceil() as usize + 1);
    let mut idx = 0.0;
    while idx < end {
        out.push(spline(&padded, idx));
        idx += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spline_hits_samples() {
        let data = [0.0, 1.0, 4.0, 9.0, 16.0];
        for (i, &v) in data.iter().enumerate() {
            assert!((spline(&data, i as f64) - v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_spline_linear_data_is_exact() {
        let data: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 1.0).collect();
        let v = spline(&data, 4.25);
        assert!((v - 9.5).abs() < 1e-12, "expected 9.5, got {v}");
    }

    #[test]
    fn test_resample_same_rate_is_copy() {
        let data = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_spline(&data, 48000.0, 48000.0), data);
    }

    #[test]
    fn test_resample_upsample_length() {
        let data = vec![1.0; 100];
        let out = resample_spline(&data, 24000.0, 48000.0);
        assert_eq!(out.len(), 200);
        assert!((out[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_resample_downsample_length() {
        let data = vec![0.5; 96];
        let out = resample_spline(&data, 96000.0, 48000.0);
        assert_eq!(out.len(), 48);
    }
}
