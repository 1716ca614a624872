use crate::models::MonthlyClimatology;

/// Month-of-year reduction used wherever a climatology is needed.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Mean of `series` per calendar month, pooling every year present.
    ///
    /// NaN samples are excluded and a month without valid samples yields NaN.
    /// Samples in each bucket are summed in sorted order so the result does not
    /// depend on the order of the input days.
    pub fn aggregate(series: &[f64], months: &[u32]) -> MonthlyClimatology {
        let mut buckets: [Vec<f64>; 12] = Default::default();

        for (&value, &month) in series.iter().zip(months.iter()) {
            if value.is_nan() || !(1..=12).contains(&month) {
                continue;
            }
            buckets[(month - 1) as usize].push(value);
        }

        let mut means = [f64::NAN; 12];
        for (mean, bucket) in means.iter_mut().zip(buckets.iter_mut()) {
            if bucket.is_empty() {
                continue;
            }
            bucket.sort_by(|a, b| a.total_cmp(b));
            *mean = bucket.iter().sum::<f64>() / bucket.len() as f64;
        }

        MonthlyClimatology::new(means)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_twelve_buckets() {
        assert_eq!(MonthlyAggregator::aggregate(&[], &[]).len(), 12);

        let clim = MonthlyAggregator::aggregate(&[f64::NAN, f64::NAN], &[1, 2]);
        assert_eq!(clim.len(), 12);
        assert_eq!(clim.missing_months().len(), 12);
    }

    #[test]
    fn test_mean_excludes_nan_and_pools_years() {
        // Two Januaries from different years and one March
        let series = [2.0, f64::NAN, 4.0, 9.0];
        let months = [1, 1, 1, 3];
        let clim = MonthlyAggregator::aggregate(&series, &months);

        assert_eq!(clim.get(1), 3.0);
        assert_eq!(clim.get(3), 9.0);
        assert!(clim.get(2).is_nan());
    }

    #[test]
    fn test_order_independent() {
        let series = [0.1, 0.7, 1e16, -1e16, 0.3, 2.2];
        let months = [5, 5, 5, 5, 5, 5];
        let forward = MonthlyAggregator::aggregate(&series, &months);

        let mut reversed = series;
        reversed.reverse();
        let backward = MonthlyAggregator::aggregate(&reversed, &months);

        assert_eq!(forward.get(5).to_bits(), backward.get(5).to_bits());
    }

    #[test]
    fn test_invalid_months_are_ignored() {
        let clim = MonthlyAggregator::aggregate(&[1.0, 5.0], &[0, 13]);
        assert_eq!(clim.missing_months().len(), 12);
    }
}
