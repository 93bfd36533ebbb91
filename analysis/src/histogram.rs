//! Equal-width binning.
//!
//! Bin edges follow the usual convention: `bins + 1` evenly spaced edges from the minimum to the
//! maximum value, widened by half a unit on each side when every value is the same. Every bin is
//! half-open except the last, which also includes its right edge.

use log::debug;

use crate::{
    errors::{StatsError, StatsResult},
    stats::min_max,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    edges: Vec<f64>,
    counts: Vec<usize>,
}

/// `bins + 1` evenly spaced edges spanning `values`.
///
/// # Errors
///
/// Returns an error if `bins` is zero, or if `values` is empty or contains a non-finite value.
#[allow(clippy::cast_precision_loss)]
pub fn bin_edges(values: &[f64], bins: usize) -> StatsResult<Vec<f64>> {
    if bins == 0 {
        return Err(StatsError::NoBins);
    }
    let (mut lo, mut hi) = min_max(values)?;
    if lo == hi {
        debug!("Every value is {lo}, widening the bin range by 0.5 on each side");
        lo -= 0.5;
        hi += 0.5;
    }

    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| lo + i as f64 * step).collect();
    edges.push(hi);
    Ok(edges)
}

/// The bin `value` falls into, or `None` if it lies outside the edges.
#[must_use]
pub fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if edges.len() < 2 || !(first..=last).contains(&value) {
        return None;
    }
    let bins = edges.len() - 1;
    // number of edges <= value, minus one, clamped so the last edge closes the final bin
    Some((edges.partition_point(|e| *e <= value) - 1).min(bins - 1))
}

impl Histogram {
    /// # Errors
    ///
    /// See [`bin_edges`].
    pub fn new(values: &[f64], bins: usize) -> StatsResult<Self> {
        let edges = bin_edges(values, bins)?;
        let mut counts = vec![0; bins];
        for &value in values {
            if let Some(i) = bin_index(&edges, value) {
                counts[i] += 1;
            }
        }
        Ok(Self { edges, counts })
    }

    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    #[must_use]
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        bin_index(&self.edges, value)
    }

    /// Midpoints of each bin.
    #[must_use]
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Width of the first bin; all bins share it up to rounding.
    #[must_use]
    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_edges_span_values() {
        let edges = bin_edges(&[0.0, 10.0, 4.0], 5).unwrap();
        assert_eq!(edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_edges_degenerate() {
        let edges = bin_edges(&[3.0, 3.0], 2).unwrap();
        assert_eq!(edges, vec![2.5, 3.0, 3.5]);
    }

    #[rstest]
    #[case(&[], 3, StatsError::Empty)]
    #[case(&[1.0], 0, StatsError::NoBins)]
    fn test_edges_errors(#[case] values: &[f64], #[case] bins: usize, #[case] expected: StatsError) {
        assert_eq!(bin_edges(values, bins), Err(expected));
    }

    #[rstest]
    #[case(0.0, Some(0))]
    #[case(1.999, Some(0))]
    #[case(2.0, Some(1))]
    #[case(9.5, Some(4))]
    #[case(10.0, Some(4))]
    #[case(10.1, None)]
    #[case(-0.1, None)]
    fn test_bin_index(#[case] value: f64, #[case] expected: Option<usize>) {
        let edges = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        assert_eq!(bin_index(&edges, value), expected);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [0.0, 1.0, 2.0, 2.5, 9.0, 10.0];
        let histogram = Histogram::new(&values, 5).unwrap();
        assert_eq!(histogram.counts(), &[2, 2, 0, 0, 2]);
        assert_eq!(histogram.counts().iter().sum::<usize>(), values.len());
        assert_eq!(histogram.centers(), vec![1.0, 3.0, 5.0, 7.0, 9.0]);
        assert_eq!(histogram.bin_width(), 2.0);
    }
}
