//! Least squares trend lines.

use log::debug;
use statrs::statistics::Statistics;

use crate::errors::{StatsError, StatsResult};

/// `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[must_use]
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
}

/// Fit a first degree polynomial to the points `(xs[i], ys[i])`.
///
/// # Errors
///
/// Returns an error if the inputs differ in length, contain non-finite values, have fewer than
/// two points, or if every x value is the same.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> StatsResult<LinearFit> {
    if xs.len() != ys.len() {
        return Err(StatsError::LengthMismatch(xs.len(), ys.len()));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    if xs.len() < 2 {
        debug!("Cannot fit a line through {} point(s)", xs.len());
        return Err(StatsError::DegenerateFit);
    }

    let variance = xs.variance();
    if variance.abs() <= f64::EPSILON * xs.iter().map(|x| x * x).sum::<f64>().max(1.0) {
        debug!("Cannot fit a line when every x value is the same");
        return Err(StatsError::DegenerateFit);
    }
    let slope = xs.covariance(ys) / variance;
    let intercept = slope.mul_add(-xs.mean(), ys.mean());

    Ok(LinearFit { slope, intercept })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_fit(&xs, &ys).unwrap();
        approx(fit.slope, 2.0);
        approx(fit.intercept, 1.0);
        approx(fit.predict(10.0), 21.0);
    }

    #[test]
    fn test_noisy_line() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = linear_fit(&xs, &ys).unwrap();
        approx(fit.slope, 0.6);
        approx(fit.intercept, 2.2);
    }

    #[rstest]
    #[case(&[], &[], StatsError::DegenerateFit)]
    #[case(&[1.0], &[1.0], StatsError::DegenerateFit)]
    #[case(&[4.0, 4.0, 4.0], &[1.0, 2.0, 3.0], StatsError::DegenerateFit)]
    #[case(&[1.0, 2.0], &[1.0], StatsError::LengthMismatch(2, 1))]
    #[case(&[1.0, f64::NAN], &[1.0, 2.0], StatsError::NonFinite)]
    fn test_degenerate_inputs(#[case] xs: &[f64], #[case] ys: &[f64], #[case] expected: StatsError) {
        assert_eq!(linear_fit(xs, ys), Err(expected));
    }
}
