//! Estimation summaries

use serde::Serialize;
use std::fmt;

/// One estimated coefficient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterEstimate {
    pub name: String,
    pub coef: f64,
    /// `None` when the information matrix is not positive definite
    pub std_err: Option<f64>,
    pub z: Option<f64>,
    pub p_value: Option<f64>,
    /// 95% confidence interval
    pub conf_int: Option<(f64, f64)>,
}

/// Test statistic with its p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

/// Summary of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub dependent: String,
    /// Observations entering the likelihood (after differencing)
    pub nobs: usize,
    pub parameters: Vec<ParameterEstimate>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub hqic: f64,
    pub converged: bool,
    pub iterations: usize,
    /// Ljung-Box Q at lag 1 on standardized residuals
    pub ljung_box: Option<TestStatistic>,
    /// Jarque-Bera normality test on standardized residuals
    pub jarque_bera: Option<TestStatistic>,
    pub skew: Option<f64>,
    pub kurtosis: Option<f64>,
}

impl ModelSummary {
    /// Coefficient by name, e.g. `ar.L1` or `sigma2`
    pub fn parameter(&self, name: &str) -> Option<&ParameterEstimate> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "nan".to_string(),
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(78);
        let thin = "-".repeat(78);

        writeln!(f, "{:^78}", "SARIMAX Results")?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<16}{:>22}   {:<18}{:>19}",
            "Dep. Variable:", self.dependent, "No. Observations:", self.nobs
        )?;
        writeln!(
            f,
            "{:<16}{:>22}   {:<18}{:>19.3}",
            "Model:", self.model, "Log Likelihood", self.log_likelihood
        )?;
        writeln!(
            f,
            "{:<16}{:>22}   {:<18}{:>19.3}",
            "Converged:", self.converged, "AIC", self.aic
        )?;
        writeln!(
            f,
            "{:<16}{:>22}   {:<18}{:>19.3}",
            "Iterations:", self.iterations, "BIC", self.bic
        )?;
        writeln!(f, "{:<16}{:>22}   {:<18}{:>19.3}", "", "", "HQIC", self.hqic)?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<14}{:>10}{:>10}{:>10}{:>10}{:>12}{:>12}",
            "", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]"
        )?;
        writeln!(f, "{}", thin)?;
        for p in &self.parameters {
            writeln!(
                f,
                "{:<14}{:>10.4}{:>10}{:>10}{:>10}{:>12}{:>12}",
                p.name,
                p.coef,
                cell(p.std_err, 3),
                cell(p.z, 3),
                cell(p.p_value, 3),
                cell(p.conf_int.map(|c| c.0), 3),
                cell(p.conf_int.map(|c| c.1), 3),
            )?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "Ljung-Box (L1) (Q): {:>8}   Jarque-Bera (JB): {:>10}",
            cell(self.ljung_box.map(|t| t.statistic), 2),
            cell(self.jarque_bera.map(|t| t.statistic), 2)
        )?;
        writeln!(
            f,
            "Prob(Q):            {:>8}   Prob(JB):         {:>10}",
            cell(self.ljung_box.map(|t| t.p_value), 2),
            cell(self.jarque_bera.map(|t| t.p_value), 2)
        )?;
        writeln!(
            f,
            "Skew:               {:>8}   Kurtosis:         {:>10}",
            cell(self.skew, 2),
            cell(self.kurtosis, 2)
        )?;
        write!(f, "{}", rule)
    }
}
