//! The canonical per-day time series and the operations built on it.
//!
//! A [`DailySeries`] is a date-indexed table of nullable numeric columns.
//! Dates are kept sorted and unique; every column has one value per date.

pub mod calendar;
pub mod derive;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// One named metric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl DailySeries {
    /// Creates a series with no columns over `dates`, which are sorted and
    /// deduplicated first.
    pub fn new(mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_unstable();
        dates.dedup();
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Builds a series by summing every row that shares a date.
    ///
    /// Each row carries one value per entry of `names`. Nulls are skipped in
    /// the sum. A date's sum is null when fewer than `min_count` of its values
    /// are non-null, so with `min_count == 0` an all-null date sums to 0.
    pub fn aggregate<I>(names: &[&str], rows: I, min_count: usize) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Vec<Option<f64>>)>,
    {
        let mut by_date: BTreeMap<NaiveDate, Vec<(f64, usize)>> = BTreeMap::new();

        for (date, values) in rows {
            let sums = by_date
                .entry(date)
                .or_insert_with(|| vec![(0.0, 0); names.len()]);
            for ((sum, count), value) in sums.iter_mut().zip(values) {
                if let Some(v) = value {
                    *sum += v;
                    *count += 1;
                }
            }
        }

        let dates: Vec<NaiveDate> = by_date.keys().copied().collect();
        let columns = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Column {
                name: name.to_string(),
                values: by_date
                    .values()
                    .map(|row| {
                        let (sum, count) = row[idx];
                        (count >= min_count).then_some(sum)
                    })
                    .collect(),
            })
            .collect();

        Self { dates, columns }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`DailySeries::column`], but a missing column is a
    /// [`Error::SchemaMismatch`] against `table`.
    pub fn require(&self, table: &str, name: &str) -> Result<&[Option<f64>]> {
        self.column(name).ok_or_else(|| Error::SchemaMismatch {
            table: table.to_string(),
            column: name.to_string(),
        })
    }

    /// Value of `name` on `date`, `None` when the date, the column or the
    /// value itself is absent.
    pub fn value(&self, date: NaiveDate, name: &str) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        self.column(name)?.get(row).copied().flatten()
    }

    /// Sets column `name`, replacing an existing column of that name.
    ///
    /// `values` must hold exactly one entry per date.
    pub fn insert(&mut self, name: &str, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.dates.len(), "column {name} length");
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
    }

    /// Renames every column to `{prefix}_{name}`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        for column in &mut self.columns {
            column.name = format!("{prefix}_{}", column.name);
        }
        self
    }

    /// Copy holding only the named columns, in the requested order. Names
    /// with no matching column are skipped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let columns = names
            .iter()
            .filter_map(|name| {
                self.columns
                    .iter()
                    .find(|c| c.name == name.as_ref())
                    .cloned()
            })
            .collect();
        Self {
            dates: self.dates.clone(),
            columns,
        }
    }

    /// Iterates rows as `(date, values)` with values in column order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, Vec<Option<f64>>)> + '_ {
        self.dates.iter().enumerate().map(move |(row, date)| {
            (
                *date,
                self.columns.iter().map(|c| c.values[row]).collect(),
            )
        })
    }

    pub(crate) fn from_parts(dates: Vec<NaiveDate>, columns: Vec<Column>) -> Self {
        Self { dates, columns }
    }
}
