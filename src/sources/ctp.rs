use super::{Provider, Source, derive_daily, derive_rolling};
use crate::error::Result;
use crate::series::DailySeries;
use crate::series::derive::subtract;

const METRICS: &[&str] = &["cases", "deaths", "recovered", "hospital", "icu", "tests"];

/// Testing tracker feed for a single state.
///
/// Rows are newest-first cumulative totals per report date with compact
/// `YYYYMMDD` dates. There is no county breakdown.
pub struct CtpSource {
    url: String,
}

impl CtpSource {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

impl Source for CtpSource {
    fn provider(&self) -> Provider {
        Provider::Ctp
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn date_column(&self) -> &'static str {
        "date"
    }

    fn date_formats(&self) -> &'static [&'static str] {
        &["%Y%m%d", "%Y-%m-%d"]
    }

    // Blank tracker cells mean "not reported", not zero.
    fn min_count(&self) -> usize {
        1
    }

    fn column_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("positive", "cml_cases"),
            ("death", "cml_deaths"),
            ("recovered", "cml_recovered"),
            ("hospitalizedCumulative", "cml_hospital"),
            ("inIcuCumulative", "cml_icu"),
            ("totalTestResults", "cml_tests"),
        ]
    }

    fn derive(&self, series: &mut DailySeries) -> Result<()> {
        let table = self.provider().id();
        derive_daily(series, table, METRICS)?;
        derive_rolling(series, table, METRICS)?;

        let open = subtract(
            series.require(table, "cml_cases")?,
            series.require(table, "cml_deaths")?,
        );
        let current = subtract(&open, series.require(table, "cml_recovered")?);
        series.insert("current_cases", current);
        Ok(())
    }
}
