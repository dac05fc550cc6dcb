pub mod bs;

/// Utility functions shared by the aggregate and plotting layers
pub mod utils {
    /// Calculate log-moneyness: ln(K/S)
    pub fn log_moneyness(strike: f64, spot: f64) -> f64 {
        (strike / spot).ln()
    }

    /// `count` evenly spaced points on `[start, end]` (both ends included)
    pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (count - 1) as f64;
                (0..count).map(|i| start + step * i as f64).collect()
            }
        }
    }
}
