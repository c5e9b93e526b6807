//! Column arithmetic used to derive metrics from aggregated series.
//!
//! Every function takes and returns whole columns (`Option<f64>` per date)
//! so that null handling stays consistent: a null operand yields a null
//! result, except in [`cumulative_sum`] where the running total skips it.

/// Number of trailing rows averaged into a `7dr_*` column.
pub const ROLLING_WINDOW: usize = 7;

/// Number of rows a case stays counted in the `current_cases` estimate.
pub const ACTIVE_WINDOW: usize = 14;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Running total of `values`. Null entries stay null and do not reset the total.
pub fn cumulative_sum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut total = 0.0;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                total += x;
                total
            })
        })
        .collect()
}

/// `values[i] - values[i - lag]`; null for the first `lag` rows.
pub fn lagged_difference(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i < lag {
                return None;
            }
            match (values[i], values[i - lag]) {
                (Some(current), Some(earlier)) => Some(current - earlier),
                _ => None,
            }
        })
        .collect()
}

/// Day-over-day delta of a cumulative column.
pub fn first_difference(values: &[Option<f64>]) -> Vec<Option<f64>> {
    lagged_difference(values, 1)
}

/// Trailing mean over `window` rows, current row included.
///
/// A row is null until `window` rows exist, and whenever any value inside
/// its window is null.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()
                .map(|w| mean(&w))
        })
        .collect()
}

/// Element-wise sum of equally long columns.
pub fn sum_columns(columns: &[&[Option<f64>]]) -> Vec<Option<f64>> {
    let len = columns.first().map_or(0, |c| c.len());
    (0..len)
        .map(|i| {
            columns
                .iter()
                .try_fold(0.0, |acc, column| column.get(i).copied().flatten().map(|v| acc + v))
        })
        .collect()
}

/// Element-wise `minuend - subtrahend`.
pub fn subtract(minuend: &[Option<f64>], subtrahend: &[Option<f64>]) -> Vec<Option<f64>> {
    minuend
        .iter()
        .zip(subtrahend)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some(a - b),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn test_cumulative_sum_skips_nulls() {
        let out = cumulative_sum(&[Some(1.0), None, Some(2.0), Some(3.0)]);
        assert_eq!(out, vec![Some(1.0), None, Some(3.0), Some(6.0)]);
    }

    #[test]
    fn test_first_difference_of_cumulative_recovers_input() {
        let input = present(&[4.0, 0.0, 7.0, 2.0, 5.0]);
        let diffed = first_difference(&cumulative_sum(&input));

        assert_eq!(diffed[0], None);
        assert_eq!(&diffed[1..], &input[1..]);
    }

    #[test]
    fn test_difference_propagates_nulls() {
        let out = first_difference(&[Some(1.0), None, Some(5.0), Some(4.0)]);
        assert_eq!(out, vec![None, None, None, Some(-1.0)]);
    }

    #[test]
    fn test_lagged_difference_keeps_negative_values() {
        let out = lagged_difference(&present(&[10.0, 12.0, 8.0]), 2);
        assert_eq!(out, vec![None, None, Some(-2.0)]);
    }

    #[test]
    fn test_rolling_mean_null_for_first_six_rows() {
        let input = present(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let out = rolling_mean(&input, ROLLING_WINDOW);

        assert!(out[..6].iter().all(Option::is_none));
        assert_eq!(out[6], Some(4.0));
        assert_eq!(out[7], Some(5.0));
        assert_eq!(out[8], Some(6.0));
    }

    #[test]
    fn test_rolling_mean_null_when_window_has_gap() {
        let mut input = present(&[1.0; 10]);
        input[3] = None;
        let out = rolling_mean(&input, ROLLING_WINDOW);

        assert!(out[..10].iter().all(Option::is_none));
    }

    #[test]
    fn test_sum_columns_and_subtract() {
        let a = [Some(1.0), Some(2.0), None];
        let b = [Some(10.0), Some(20.0), Some(30.0)];

        assert_eq!(sum_columns(&[&a, &b]), vec![Some(11.0), Some(22.0), None]);
        assert_eq!(subtract(&a, &b), vec![Some(-9.0), Some(-18.0), None]);
    }
}
