//! Date alignment: outer joins and gap filling on the daily calendar.

use chrono::NaiveDate;

use super::{Column, DailySeries};
use crate::error::{Error, Result};

/// Re-expresses every column of `series` over `dates`, null where `series`
/// has no row for a date.
fn reindex(series: &DailySeries, dates: &[NaiveDate]) -> Vec<Column> {
    let positions: Vec<Option<usize>> = dates
        .iter()
        .map(|date| series.dates().binary_search(date).ok())
        .collect();

    series
        .columns()
        .iter()
        .map(|column| Column {
            name: column.name.clone(),
            values: positions
                .iter()
                .map(|pos| pos.and_then(|row| column.values[row]))
                .collect(),
        })
        .collect()
}

/// Union of both date sets, every column from both sides, nulls where a
/// side has no row for a date.
///
/// # Errors
///
/// Returns [`Error::ColumnConflict`] if both sides carry a column of the
/// same name.
pub fn outer_join(left: &DailySeries, right: &DailySeries) -> Result<DailySeries> {
    if let Some(name) = left
        .column_names()
        .find(|name| right.column(name).is_some())
    {
        return Err(Error::ColumnConflict(name.to_string()));
    }

    let mut dates = left.dates().to_vec();
    dates.extend_from_slice(right.dates());
    let dates = DailySeries::new(dates).dates().to_vec();

    let mut columns = reindex(left, &dates);
    columns.extend(reindex(right, &dates));

    Ok(DailySeries::from_parts(dates, columns))
}

/// Every calendar day from the first to the last date of `series`, with
/// null rows inserted for days it lacks.
pub fn fill_calendar(series: &DailySeries) -> DailySeries {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return series.clone();
    };

    let dates: Vec<NaiveDate> = first.iter_days().take_while(|d| *d <= last).collect();
    let columns = reindex(series, &dates);
    DailySeries::from_parts(dates, columns)
}

/// Outer-joins all of `parts` in order, then fills the calendar between the
/// global minimum and maximum dates.
pub fn align(parts: &[&DailySeries]) -> Result<DailySeries> {
    let joined = parts
        .iter()
        .try_fold(DailySeries::default(), |acc, part| outer_join(&acc, part))?;
    Ok(fill_calendar(&joined))
}
