//! Provider endpoints and region naming, read from the environment.

use std::env;

pub const DEFAULT_OSDH_URL: &str =
    "https://storage.googleapis.com/ok-covid-gcs-public-download/oklahoma_cases_osdh_county.csv";
pub const DEFAULT_NYT_URL: &str =
    "https://github.com/nytimes/covid-19-data/blob/master/us-counties.csv?raw=true";
pub const DEFAULT_STATE_NAME: &str = "Oklahoma";
pub const DEFAULT_STATE_CODE: &str = "ok";
pub const DEFAULT_SCOPE: &str = "Tulsa";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub osdh_url: String,
    pub nyt_url: String,
    /// Overrides the tracker URL derived from `state_code`.
    pub ctp_url: Option<String>,
    /// State name as spelled in the newspaper feed's `state` column.
    pub state_name: String,
    /// Lowercase postal code, used in prefixes and the tracker URL.
    pub state_code: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            osdh_url: DEFAULT_OSDH_URL.to_string(),
            nyt_url: DEFAULT_NYT_URL.to_string(),
            ctp_url: None,
            state_name: DEFAULT_STATE_NAME.to_string(),
            state_code: DEFAULT_STATE_CODE.to_string(),
        }
    }
}

impl Settings {
    /// Reads `COVID_OSDH_URL`, `COVID_NYT_URL`, `COVID_CTP_URL`,
    /// `COVID_STATE_NAME` and `COVID_STATE_CODE`, falling back to defaults
    /// for unset or empty variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            osdh_url: var("COVID_OSDH_URL").unwrap_or(defaults.osdh_url),
            nyt_url: var("COVID_NYT_URL").unwrap_or(defaults.nyt_url),
            ctp_url: var("COVID_CTP_URL"),
            state_name: var("COVID_STATE_NAME").unwrap_or(defaults.state_name),
            state_code: var("COVID_STATE_CODE")
                .map(|c| c.to_lowercase())
                .unwrap_or(defaults.state_code),
        }
    }

    pub fn ctp_url(&self) -> String {
        self.ctp_url.clone().unwrap_or_else(|| {
            format!(
                "https://covidtracking.com/api/v1/states/{}/daily.csv",
                self.state_code
            )
        })
    }
}

/// Short code for a sub-region used in column prefixes: the first three
/// letters, lowercased ("Tulsa" -> "tul").
pub fn scope_code(scope: &str) -> String {
    scope
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .flat_map(char::to_lowercase)
        .collect()
}
