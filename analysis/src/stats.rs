//! Means and quartiles.

use ndarray::{Array1, Axis};
use ndarray_stats::{QuantileExt, interpolate::Linear};
use noisy_float::prelude::*;
use statrs::statistics::Statistics;

use crate::errors::{StatsError, StatsResult};

fn ensure_finite(values: &[f64]) -> StatsResult<()> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    Ok(())
}

/// The arithmetic mean of `values`.
///
/// # Errors
///
/// Returns an error if `values` is empty or contains a non-finite value.
#[inline]
pub fn mean(values: &[f64]) -> StatsResult<f64> {
    ensure_finite(values)?;
    Ok(values.mean())
}

/// Median, lower and upper quartile, and count of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub count: usize,
}

/// The `q`-th quantile of `values`, linearly interpolating between closest ranks.
///
/// # Errors
///
/// Returns an error if `values` is empty or contains a non-finite value, or if `q` is outside
/// `[0, 1]`.
#[inline]
pub fn quantile(values: &[f64], q: f64) -> StatsResult<f64> {
    ensure_finite(values)?;
    let mut array: Array1<N64> = values.iter().copied().map(n64).collect();
    quantile_of(&mut array, q)
}

fn quantile_of(array: &mut Array1<N64>, q: f64) -> StatsResult<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(StatsError::Quantile(format!("{q} is not within [0, 1]")));
    }
    array
        .quantile_axis_mut(Axis(0), n64(q), &Linear)
        .map(|q| q.into_scalar().raw())
        .map_err(|e| StatsError::Quantile(e.to_string()))
}

/// # Errors
///
/// Returns an error if `values` is empty or contains a non-finite value.
#[inline]
pub fn quartiles(values: &[f64]) -> StatsResult<Quartiles> {
    ensure_finite(values)?;
    let mut array: Array1<N64> = values.iter().copied().map(n64).collect();

    Ok(Quartiles {
        q1: quantile_of(&mut array, 0.25)?,
        median: quantile_of(&mut array, 0.5)?,
        q3: quantile_of(&mut array, 0.75)?,
        count: values.len(),
    })
}

/// The smallest and largest of `values`.
///
/// # Errors
///
/// Returns an error if `values` is empty or contains a non-finite value.
#[inline]
pub fn min_max(values: &[f64]) -> StatsResult<(f64, f64)> {
    ensure_finite(values)?;
    let array: Array1<N64> = values.iter().copied().map(n64).collect();
    let min = array.min().map_err(|e| StatsError::Quantile(e.to_string()))?;
    let max = array.max().map_err(|e| StatsError::Quantile(e.to_string()))?;
    Ok((min.raw(), max.raw()))
}
