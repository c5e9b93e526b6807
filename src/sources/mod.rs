//! Provider sources and the normalization pipeline they share.
//!
//! Each provider implements [`Source`] by describing its raw columns:
//! which holds the date, which holds the sub-region, how raw numeric
//! columns map onto canonical names, and which metrics must be derived.
//! [`Source::normalize`] runs the common steps (parse, filter, project,
//! aggregate, derive, prefix) over that description.

mod ctp;
mod nyt;
mod osdh;

pub use ctp::CtpSource;
pub use nyt::NytSource;
pub use osdh::OsdhSource;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::series::DailySeries;
use crate::series::derive::{ROLLING_WINDOW, cumulative_sum, first_difference, rolling_mean};
use crate::table::RawTable;

/// The three published datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    /// State health department, one row per county and onset date.
    Osdh,
    /// National newspaper, cumulative totals per county and report date.
    Nyt,
    /// Testing tracker, cumulative state totals per report date.
    Ctp,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Osdh, Provider::Nyt, Provider::Ctp];

    /// Short identifier used in cache keys and column prefixes.
    pub fn id(self) -> &'static str {
        match self {
            Provider::Osdh => "osdh",
            Provider::Nyt => "nyt",
            Provider::Ctp => "ctp",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Provider::Osdh => "state health department county case feed",
            Provider::Nyt => "newspaper county cumulative feed",
            Provider::Ctp => "state testing tracker daily feed",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown provider {s:?} (expected osdh, nyt or ctp)"))
    }
}

pub trait Source {
    fn provider(&self) -> Provider;

    /// Where the raw table is fetched from.
    fn url(&self) -> &str;

    fn date_column(&self) -> &'static str;

    /// `chrono` formats tried in order when parsing the date column.
    fn date_formats(&self) -> &'static [&'static str];

    /// Column holding the sub-region name, if the feed has one.
    fn scope_column(&self) -> Option<&'static str> {
        None
    }

    /// The scope filter as it is spelled in this provider's raw data.
    fn scope_key(&self, scope: &str) -> String {
        scope.to_string()
    }

    /// `(column, value)` pairs every kept row must match, scope or not.
    fn fixed_filters(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Fewest non-null values a date needs for its summed value to be
    /// non-null. At 0, a date whose cells are all blank sums to 0.
    fn min_count(&self) -> usize {
        0
    }

    /// Raw numeric columns and the canonical names they are renamed to.
    fn column_map(&self) -> &'static [(&'static str, &'static str)];

    /// Adds the derived metric columns to an aggregated, unprefixed series.
    fn derive(&self, series: &mut DailySeries) -> Result<()>;

    /// Turns a raw provider table into a prefixed [`DailySeries`].
    ///
    /// A scope that matches no rows produces an empty series.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedDate`] if any row's date cannot be parsed.
    /// - [`Error::SchemaMismatch`] if an expected raw column is missing.
    /// - [`Error::MalformedNumber`] if a kept row has a non-numeric value.
    /// - [`Error::ScopeUnsupported`] if `scope` is given for a provider with
    ///   no sub-region column.
    fn normalize(&self, raw: &RawTable, scope: Option<&str>, prefix: &str) -> Result<DailySeries> {
        let table = raw.name();
        let date_column = self.date_column();
        let date_idx = raw.column_index(date_column)?;

        let scope_filter = match scope {
            None => None,
            Some(scope) => {
                let column = self.scope_column().ok_or_else(|| Error::ScopeUnsupported {
                    provider: self.provider().to_string(),
                    scope: scope.to_string(),
                })?;
                Some((raw.column_index(column)?, self.scope_key(scope)))
            }
        };

        let filters = self
            .fixed_filters()
            .into_iter()
            .map(|(column, want)| -> Result<(usize, String)> {
                Ok((raw.column_index(column)?, want))
            })
            .chain(scope_filter.map(Ok))
            .collect::<Result<Vec<_>>>()?;

        let mapping = self.column_map();
        let value_idx = mapping
            .iter()
            .map(|(column, _)| raw.column_index(column))
            .collect::<Result<Vec<_>>>()?;
        let names: Vec<&str> = mapping.iter().map(|(_, name)| *name).collect();

        let mut rows = Vec::new();
        for record in raw.rows() {
            let date = parse_date(table, date_column, &record[date_idx], self.date_formats())?;

            if !filters.iter().all(|(idx, want)| &record[*idx] == want) {
                continue;
            }

            let values = mapping
                .iter()
                .zip(&value_idx)
                .map(|((column, _), idx)| parse_number(table, column, &record[*idx]))
                .collect::<Result<Vec<_>>>()?;
            rows.push((date, values));
        }

        debug!(
            provider = %self.provider(),
            scope = scope.unwrap_or("-"),
            raw_rows = raw.len(),
            kept_rows = rows.len(),
            "Filtered provider rows"
        );

        let mut series = DailySeries::aggregate(&names, rows, self.min_count());
        self.derive(&mut series)?;

        debug!(
            provider = %self.provider(),
            prefix,
            dates = series.len(),
            columns = series.columns().len(),
            "Normalized series"
        );

        Ok(series.with_prefix(prefix))
    }
}

/// One source per provider, built from [`Settings`].
pub struct SourceRegistry {
    osdh: OsdhSource,
    nyt: NytSource,
    ctp: CtpSource,
}

impl SourceRegistry {
    pub fn new(settings: &Settings) -> Self {
        Self {
            osdh: OsdhSource::new(settings.osdh_url.clone()),
            nyt: NytSource::new(settings.nyt_url.clone(), settings.state_name.clone()),
            ctp: CtpSource::new(settings.ctp_url()),
        }
    }

    pub fn get(&self, provider: Provider) -> &dyn Source {
        match provider {
            Provider::Osdh => &self.osdh,
            Provider::Nyt => &self.nyt,
            Provider::Ctp => &self.ctp,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Source> {
        Provider::ALL.into_iter().map(|p| self.get(p))
    }
}

/// Parses a raw date cell, ignoring a trailing time-of-day component.
pub fn parse_date(table: &str, column: &str, value: &str, formats: &[&str]) -> Result<NaiveDate> {
    let value = value.trim();
    let day_part = value.split(['T', ' ']).next().unwrap_or(value);

    formats
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(value, fmt)
                .or_else(|_| NaiveDate::parse_from_str(day_part, fmt))
                .ok()
        })
        .ok_or_else(|| Error::MalformedDate {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Parses a raw numeric cell; an empty cell is null.
pub fn parse_number(table: &str, column: &str, value: &str) -> Result<Option<f64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::MalformedNumber {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Capitalizes the first letter of every word and lowercases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// `cml_{metric}` as the running sum of `new_{metric}`.
fn derive_cumulative(series: &mut DailySeries, table: &str, metrics: &[&str]) -> Result<()> {
    for metric in metrics {
        let cumulative = cumulative_sum(series.require(table, &format!("new_{metric}"))?);
        series.insert(&format!("cml_{metric}"), cumulative);
    }
    Ok(())
}

/// `new_{metric}` as the day-over-day difference of `cml_{metric}`.
fn derive_daily(series: &mut DailySeries, table: &str, metrics: &[&str]) -> Result<()> {
    for metric in metrics {
        let daily = first_difference(series.require(table, &format!("cml_{metric}"))?);
        series.insert(&format!("new_{metric}"), daily);
    }
    Ok(())
}

/// `7dr_{metric}` as the trailing 7-row mean of `new_{metric}`.
fn derive_rolling(series: &mut DailySeries, table: &str, metrics: &[&str]) -> Result<()> {
    for metric in metrics {
        let rolling = rolling_mean(series.require(table, &format!("new_{metric}"))?, ROLLING_WINDOW);
        series.insert(&format!("7dr_{metric}"), rolling);
    }
    Ok(())
}
