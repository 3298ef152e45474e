//! Lag polynomial arithmetic
//!
//! Polynomials are stored as coefficient vectors in ascending powers of the
//! lag operator, constant term first.

/// Product of two lag polynomials
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// Autoregressive polynomial `1 - c1 L^s - c2 L^2s - ...`
pub fn ar_polynomial(coefficients: &[f64], spacing: usize) -> Vec<f64> {
    lag_polynomial(coefficients, spacing, -1.0)
}

/// Moving-average polynomial `1 + c1 L^s + c2 L^2s + ...`
pub fn ma_polynomial(coefficients: &[f64], spacing: usize) -> Vec<f64> {
    lag_polynomial(coefficients, spacing, 1.0)
}

fn lag_polynomial(coefficients: &[f64], spacing: usize, sign: f64) -> Vec<f64> {
    if coefficients.is_empty() || spacing == 0 {
        return vec![1.0];
    }

    let mut poly = vec![0.0; coefficients.len() * spacing + 1];
    poly[0] = 1.0;
    for (i, &c) in coefficients.iter().enumerate() {
        poly[(i + 1) * spacing] = sign * c;
    }
    poly
}

/// MA(infinity) weights of `ma(L) / ar(L)`, starting with psi_0 = 1.
///
/// `ar` must have a leading coefficient of one.
pub fn psi_weights(ar: &[f64], ma: &[f64], count: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(count);
    for j in 0..count {
        let mut value = ma.get(j).copied().unwrap_or(0.0);
        for k in 1..ar.len().min(j + 1) {
            value -= ar[k] * psi[j - k];
        }
        psi.push(value);
    }
    psi
}
