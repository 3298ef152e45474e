//! Descriptive statistics over slices

/// Arithmetic mean, `None` for an empty slice
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample variance with `ddof` degrees of freedom removed
pub fn variance(data: &[f64], ddof: usize) -> Option<f64> {
    if data.len() <= ddof {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Some(ss / (data.len() - ddof) as f64)
}

/// Sample standard deviation with `ddof` degrees of freedom removed
pub fn std_dev(data: &[f64], ddof: usize) -> Option<f64> {
    variance(data, ddof).map(f64::sqrt)
}

/// Sample autocorrelation at `lag`, using the biased (n-denominator) estimator
pub fn autocorrelation(data: &[f64], lag: usize) -> Option<f64> {
    let n = data.len();
    if lag >= n {
        return None;
    }
    let m = mean(data)?;
    let denom: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    if denom == 0.0 {
        return None;
    }
    let num: f64 = (lag..n).map(|t| (data[t] - m) * (data[t - lag] - m)).sum();
    Some(num / denom)
}

/// Skewness and kurtosis (not excess) using population moments
pub fn skewness_kurtosis(data: &[f64]) -> Option<(f64, f64)> {
    let n = data.len() as f64;
    let m = mean(data)?;
    let m2 = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return None;
    }
    let m3 = data.iter().map(|x| (x - m).powi(3)).sum::<f64>() / n;
    let m4 = data.iter().map(|x| (x - m).powi(4)).sum::<f64>() / n;
    Some((m3 / m2.powf(1.5), m4 / (m2 * m2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moments() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&data), Some(5.0));
        assert_relative_eq!(variance(&data, 0).unwrap(), 4.0);
        assert_relative_eq!(std_dev(&data, 0).unwrap(), 2.0);
        assert!(mean(&[]).is_none());
        assert!(variance(&[1.0], 1).is_none());
    }

    #[test]
    fn test_autocorrelation_of_alternating_series() {
        let data: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let rho = autocorrelation(&data, 1).unwrap();
        assert!(rho < -0.9);
        assert!(autocorrelation(&[1.0, 1.0, 1.0], 1).is_none());
    }

    #[test]
    fn test_symmetric_data_has_zero_skew() {
        let (skew, kurt) = skewness_kurtosis(&[-2.0, -1.0, 0.0, 1.0, 2.0]).unwrap();
        assert_relative_eq!(skew, 0.0, epsilon = 1e-12);
        assert_relative_eq!(kurt, 1.7, epsilon = 1e-12);
    }
}
