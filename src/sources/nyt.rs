use super::{Provider, Source, derive_daily, derive_rolling, title_case};
use crate::error::Result;
use crate::series::DailySeries;

/// Newspaper county feed covering every state.
///
/// Rows carry cumulative cases and deaths per county and report date, so
/// daily values are first differences. County names are title-cased.
pub struct NytSource {
    url: String,
    state: String,
}

impl NytSource {
    pub fn new(url: String, state: String) -> Self {
        Self { url, state }
    }
}

impl Source for NytSource {
    fn provider(&self) -> Provider {
        Provider::Nyt
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn date_column(&self) -> &'static str {
        "date"
    }

    fn date_formats(&self) -> &'static [&'static str] {
        &["%Y-%m-%d"]
    }

    fn scope_column(&self) -> Option<&'static str> {
        Some("county")
    }

    fn scope_key(&self, scope: &str) -> String {
        title_case(scope)
    }

    fn fixed_filters(&self) -> Vec<(&'static str, String)> {
        vec![("state", self.state.clone())]
    }

    fn column_map(&self) -> &'static [(&'static str, &'static str)] {
        &[("cases", "cml_cases"), ("deaths", "cml_deaths")]
    }

    fn derive(&self, series: &mut DailySeries) -> Result<()> {
        let table = self.provider().id();
        derive_daily(series, table, &["cases", "deaths"])?;
        derive_rolling(series, table, &["cases", "deaths"])
    }
}
