/// Deterministic, evenly spaced sample of `sample` indices across `[0, n)`.
///
/// Always strictly increasing, always includes both endpoints when
/// `sample >= 2`, and identical inputs produce identical output, since size
/// metrics must be reproducible run to run.
pub fn sample_indices(n: usize, sample: usize) -> Vec<usize> {
    if n == 0 || sample == 0 {
        return Vec::new();
    }
    if sample >= n {
        return (0..n).collect();
    }
    if sample == 1 {
        return vec![0];
    }
    let step = (n - 1) as f64 / (sample - 1) as f64;
    let mut indices = Vec::with_capacity(sample);
    let mut last: Option<usize> = None;
    for i in 0..sample {
        let mut idx = (i as f64 * step).round() as usize;
        // Rounding can land on the previous pick; bump to keep the sequence
        // strictly increasing.
        if let Some(prev) = last {
            if idx <= prev {
                idx = prev + 1;
            }
        }
        if idx >= n {
            idx = n - 1;
        }
        indices.push(idx);
        last = Some(idx);
    }
    indices
}
