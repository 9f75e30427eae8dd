//! Bounded-memory response size distribution.
//!
//! Backed by an HDR histogram: every magnitude band holds the same number of
//! linearly spaced sub-buckets and each band is twice as wide as the previous
//! one. With `d` significant digits every recorded value lands in a bucket
//! whose width is at most `1 / 10^d` of the value, so the memory footprint
//! depends only on the trackable range and the precision.

use hdrhistogram::Histogram;

use crate::error::DistributionError;

/// Largest response size tracked by the analyzer.
pub const DEFAULT_HIGHEST_TRACKABLE: u64 = 100_000_000;
/// Significant decimal digits kept by the analyzer.
pub const DEFAULT_SIGNIFICANT_DIGITS: u8 = 3;

const LOWEST_DISCERNIBLE: u64 = 1;
const MAX_SIGNIFICANT_DIGITS: u8 = 5;

#[derive(Debug, Clone)]
pub struct ApproximateDistribution {
    histogram: Histogram<u64>,
    highest_trackable: u64,
    significant_digits: u8,
}

impl ApproximateDistribution {
    /// Create an empty distribution covering `[0, highest_trackable]`.
    pub fn new(highest_trackable: u64, significant_digits: u8) -> Result<Self, DistributionError> {
        if significant_digits == 0 || significant_digits > MAX_SIGNIFICANT_DIGITS {
            return Err(DistributionError::InvalidBounds(
                "significant digits must be between 1 and 5",
            ));
        }
        if highest_trackable < 2 * LOWEST_DISCERNIBLE {
            return Err(DistributionError::InvalidBounds(
                "highest trackable value must be at least 2",
            ));
        }

        let histogram =
            Histogram::new_with_bounds(LOWEST_DISCERNIBLE, highest_trackable, significant_digits)
                .map_err(|_| DistributionError::InvalidBounds("histogram bounds rejected"))?;

        Ok(Self {
            histogram,
            highest_trackable,
            significant_digits,
        })
    }

    /// Distribution with the analyzer's default range and precision.
    pub fn for_response_sizes() -> Self {
        Self::new(DEFAULT_HIGHEST_TRACKABLE, DEFAULT_SIGNIFICANT_DIGITS)
            .unwrap_or_else(|_| unreachable!("default distribution bounds are valid"))
    }

    /// Count one observation.
    ///
    /// Values above the trackable maximum are refused and leave the
    /// distribution untouched, even when they would still fit the top bucket.
    pub fn record(&mut self, value: u64) -> Result<(), DistributionError> {
        let out_of_range = DistributionError::ValueOutOfRange {
            value,
            max: self.highest_trackable,
        };
        if value > self.highest_trackable {
            return Err(out_of_range);
        }
        self.histogram.record(value).map_err(|_| out_of_range)
    }

    /// Approximate value at percentile `p` (in `(0, 100]`).
    ///
    /// This is not an exact order statistic. The answer is the upper edge of
    /// the first bucket whose cumulative count reaches `ceil(p / 100 * count)`,
    /// capped at the trackable maximum, so it may overshoot the true value by
    /// up to one bucket width, i.e. a relative error bounded by the configured
    /// significant digits. Values below `2 * 10^digits` are stored exactly.
    /// The result only depends on the multiset of recorded values, never on
    /// the order they arrived in.
    ///
    /// Returns 0 for an empty distribution.
    pub fn percentile(&self, p: f64) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let p = if p.is_nan() { 100.0 } else { p.clamp(0.0, 100.0) };
        self.histogram
            .value_at_quantile(p / 100.0)
            .min(self.highest_trackable)
    }

    /// Number of recorded observations.
    pub fn count(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }

    pub fn highest_trackable(&self) -> u64 {
        self.highest_trackable
    }

    pub fn significant_digits(&self) -> u8 {
        self.significant_digits
    }
}
