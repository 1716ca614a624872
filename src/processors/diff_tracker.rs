use crate::models::{DailyTable, OutputTables, TableRow, VariableStore};

/// Audit tables comparing corrected values against the original snapshot.
pub struct DiffTracker;

impl DiffTracker {
    /// Corrected minus original. Both missing is an unchanged 0; exactly one
    /// missing is NaN because a value was filled or removed rather than edited.
    pub fn diff(original: f64, corrected: f64) -> f64 {
        match (original.is_nan(), corrected.is_nan()) {
            (true, true) => 0.0,
            (true, false) | (false, true) => f64::NAN,
            (false, false) => corrected - original,
        }
    }

    /// 0 where nothing changed, otherwise the corrected value itself.
    pub fn fill_indicator(original: f64, corrected: f64) -> f64 {
        if original == corrected || (original.is_nan() && corrected.is_nan()) {
            0.0
        } else {
            corrected
        }
    }

    pub fn diff_series(original: &[f64], corrected: &[f64]) -> Vec<f64> {
        original
            .iter()
            .zip(corrected)
            .map(|(&o, &c)| Self::diff(o, c))
            .collect()
    }

    pub fn fill_series(original: &[f64], corrected: &[f64]) -> Vec<f64> {
        original
            .iter()
            .zip(corrected)
            .map(|(&o, &c)| Self::fill_indicator(o, c))
            .collect()
    }

    /// Corrected, delta and fill tables for every day of the store.
    pub fn tables(store: &VariableStore) -> OutputTables {
        let original = store.original_table();
        let corrected = store.corrected_table();

        let delta = Self::combine(&original, &corrected, Self::diff);
        let fill = Self::combine(&original, &corrected, Self::fill_indicator);

        OutputTables {
            corrected,
            delta,
            fill,
        }
    }

    fn combine(original: &DailyTable, corrected: &DailyTable, op: fn(f64, f64) -> f64) -> DailyTable {
        let rows = original
            .rows
            .iter()
            .zip(&corrected.rows)
            .map(|(o, c)| {
                let mut row = TableRow {
                    year: c.year,
                    month: c.month,
                    day: c.day,
                    values: c.values,
                };
                for (value, (&before, &after)) in row.values.iter_mut().zip(o.values.iter().zip(&c.values)) {
                    *value = op(before, after);
                }
                row
            })
            .collect();
        DailyTable::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_conventions() {
        assert_eq!(DiffTracker::diff(f64::NAN, f64::NAN), 0.0);
        assert!(DiffTracker::diff(f64::NAN, 3.0).is_nan());
        assert!(DiffTracker::diff(3.0, f64::NAN).is_nan());
        assert_eq!(DiffTracker::diff(2.5, 4.0), 1.5);
    }

    #[test]
    fn test_fill_indicator_marks_value() {
        assert_eq!(DiffTracker::fill_indicator(f64::NAN, f64::NAN), 0.0);
        assert_eq!(DiffTracker::fill_indicator(7.0, 7.0), 0.0);
        assert_eq!(DiffTracker::fill_indicator(f64::NAN, 5.25), 5.25);
        assert_eq!(DiffTracker::fill_indicator(4.0, 6.0), 6.0);
        assert!(DiffTracker::fill_indicator(4.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_round_trip_where_both_defined() {
        let original = [1.5, 20.25, -3.0, f64::NAN];
        let corrected = [1.5, 18.0, -2.5, f64::NAN];
        let delta = DiffTracker::diff_series(&original, &corrected);

        for day in 0..3 {
            assert_eq!(original[day] + delta[day], corrected[day]);
        }
        assert_eq!(delta[3], 0.0);
    }
}
