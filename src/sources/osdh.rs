use super::{Provider, Source, derive_cumulative, derive_rolling};
use crate::error::Result;
use crate::series::DailySeries;
use crate::series::derive::{ACTIVE_WINDOW, lagged_difference, sum_columns};

/// State health department feed.
///
/// Rows are per county and symptom-onset date, split into cases still
/// active, deceased and recovered. The three add up to the day's new cases;
/// cumulative columns are running sums. County names are published in
/// uppercase.
pub struct OsdhSource {
    url: String,
}

impl OsdhSource {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl Source for OsdhSource {
    fn provider(&self) -> Provider {
        Provider::Osdh
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn date_column(&self) -> &'static str {
        "OnsetDate"
    }

    fn date_formats(&self) -> &'static [&'static str] {
        &["%Y-%m-%d", "%m/%d/%Y"]
    }

    fn scope_column(&self) -> Option<&'static str> {
        Some("County")
    }

    fn scope_key(&self, scope: &str) -> String {
        scope.to_uppercase()
    }

    fn column_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Active", "active_on"),
            ("Deceased", "new_deaths"),
            ("Recovered", "new_recovered"),
        ]
    }

    fn derive(&self, series: &mut DailySeries) -> Result<()> {
        let table = self.provider().id();

        let new_cases = sum_columns(&[
            series.require(table, "active_on")?,
            series.require(table, "new_deaths")?,
            series.require(table, "new_recovered")?,
        ]);
        series.insert("new_cases", new_cases);

        derive_cumulative(series, table, &["cases", "deaths", "recovered"])?;
        derive_rolling(series, table, &["cases", "deaths", "recovered"])?;

        // Cases onset within the trailing window are treated as active.
        let current = lagged_difference(series.require(table, "cml_cases")?, ACTIVE_WINDOW);
        series.insert("current_cases", current);
        Ok(())
    }
}
