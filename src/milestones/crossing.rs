/// Thresholds newly reached between two checkpoints: every `t` with
/// `previous < t <= current`, in the order given.
///
/// A `current` below `previous` (a downward data correction) yields nothing.
pub fn crossed(current: f64, previous: f64, thresholds: &[u32]) -> Vec<u32> {
    thresholds
        .iter()
        .copied()
        .filter(|&threshold| {
            let threshold = f64::from(threshold);
            current >= threshold && previous < threshold
        })
        .collect()
}
