//! MacKinnon response surfaces for the Dickey-Fuller distribution
//!
//! Only the single-series, constant-only regression is tabulated, which is
//! the case used by the stationarity check. Approximate p-values follow
//! MacKinnon (1994); finite-sample critical values follow MacKinnon (2010).

use crate::distributions::normal_cdf;
use serde::{Deserialize, Serialize};

const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

const CRIT_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Dickey-Fuller critical values at the usual test sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_percent: f64,
    pub five_percent: f64,
    pub ten_percent: f64,
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate p-value of an ADF statistic (constant, no trend)
pub fn p_value(statistic: f64) -> f64 {
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    normal_cdf(polyval(coefficients, statistic))
}

/// Finite-sample critical values for `nobs` regression observations
pub fn critical_values(nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs.max(1) as f64;
    let at = |c: &[f64; 4]| c[0] + c[1] * inv + c[2] * inv * inv + c[3] * inv * inv * inv;

    CriticalValues {
        one_percent: at(&CRIT_1),
        five_percent: at(&CRIT_5),
        ten_percent: at(&CRIT_10),
    }
}
