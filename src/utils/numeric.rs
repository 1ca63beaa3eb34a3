//! Numeric helpers shared by the generator, evaluation and inference
//!
//! Rounding is "round half to even" on the scaled value, so exact ties such
//! as `80.25` at one decimal go to the even neighbour (`80.2`).

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}

/// Clamp into a closed interval
pub fn clip(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// `n` evenly spaced values over `[min, max]`, both ends included
///
/// A degenerate interval (`min == max`) or `n == 1` yields a constant column;
/// the spacing is computed from `n - 1`, never from the interval width.
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { max } else { min + step * i as f64 })
                .collect()
        }
    }
}

/// Arithmetic mean (0.0 for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(80.0, 120.0, 200);
        assert_eq!(v.len(), 200);
        assert_eq!(v[0], 80.0);
        assert_eq!(v[199], 120.0);
    }

    #[test]
    fn test_linspace_degenerate_interval() {
        let v = linspace(6.5, 6.5, 5);
        assert!(v.iter().all(|&x| x == 6.5));
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(3.0, 9.0, 0).is_empty());
    }

    #[test]
    fn test_round_to() {
        assert_relative_eq!(round_to(24.456, 2), 24.46, epsilon = 1e-12);
        assert_relative_eq!(round_to(80.25, 1), 80.2, epsilon = 1e-12);
        assert_relative_eq!(round_to(2.5, 0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(round_to(-3.5, 0), -4.0, epsilon = 1e-12);
        assert_relative_eq!(round_to(7.0, 2), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mean_std() {
        let v = [0.9, 0.95, 1.0, 0.95, 0.9];
        assert_relative_eq!(mean(&v), 0.94, epsilon = 1e-12);
        assert_relative_eq!(std_dev(&v), 0.037416573867739, epsilon = 1e-9);
        assert_eq!(std_dev(&[]), 0.0);
    }
}
