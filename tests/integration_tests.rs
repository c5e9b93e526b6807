use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::NaiveDate;
use covid_trends::config::Settings;
use covid_trends::error::Error;
use covid_trends::fetch::HttpClient;
use covid_trends::pipeline::Pipeline;
use covid_trends::sources::Provider;

/// Serves fixture CSVs by location and counts every read.
#[derive(Default)]
struct FixtureClient {
    files: HashMap<&'static str, &'static [u8]>,
    reads: RefCell<HashMap<String, usize>>,
}

impl FixtureClient {
    fn all() -> Self {
        let mut client = Self::default();
        client.files.insert("fixture://osdh", include_bytes!("fixtures/osdh.csv"));
        client.files.insert("fixture://nyt", include_bytes!("fixtures/nyt.csv"));
        client.files.insert("fixture://ctp", include_bytes!("fixtures/ctp.csv"));
        client
    }

    fn reads(&self, location: &str) -> usize {
        self.reads.borrow().get(location).copied().unwrap_or(0)
    }

    fn total_reads(&self) -> usize {
        self.reads.borrow().values().sum()
    }
}

impl HttpClient for FixtureClient {
    fn get(&self, location: &str) -> covid_trends::Result<Vec<u8>> {
        *self.reads.borrow_mut().entry(location.to_string()).or_default() += 1;
        self.files
            .get(location)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| Error::SourceUnavailable {
                location: location.to_string(),
                reason: "no such fixture".to_string(),
            })
    }
}

fn settings() -> Settings {
    Settings {
        osdh_url: "fixture://osdh".to_string(),
        nyt_url: "fixture://nyt".to_string(),
        ctp_url: Some("fixture://ctp".to_string()),
        ..Settings::default()
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
}

#[test]
fn test_combined_covers_every_day_between_global_bounds() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    let combined = pipeline.combined("Tulsa").expect("combine fixtures");

    // osdh starts on the 1st, nyt ends on the 12th
    assert_eq!(combined.first_date(), Some(day(1)));
    assert_eq!(combined.last_date(), Some(day(12)));
    assert_eq!(combined.len(), 12);
    assert!(
        combined
            .dates()
            .windows(2)
            .all(|w| w[0].succ_opt() == Some(w[1]))
    );

    for name in [
        "osdh_ok_cml_cases",
        "osdh_tul_cml_cases",
        "nyt_ok_cml_cases",
        "nyt_tul_cml_cases",
        "ctp_ok_cml_cases",
        "osdh_ok_current_cases",
        "ctp_ok_current_cases",
        "ctp_ok_7dr_tests",
    ] {
        assert!(combined.column(name).is_some(), "{name} missing");
    }
    assert!(combined.column("ctp_tul_cml_cases").is_none());
}

#[test]
fn test_gap_days_are_null_not_zero() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    let combined = pipeline.combined("Tulsa").unwrap();

    // No osdh rows were published for the 5th.
    assert_eq!(combined.value(day(5), "osdh_ok_new_cases"), None);
    assert_eq!(combined.value(day(5), "nyt_ok_cml_cases"), Some(3.0));
    // nyt has nothing before the 3rd.
    assert_eq!(combined.value(day(1), "nyt_tul_cml_cases"), None);
    assert_eq!(combined.value(day(1), "osdh_ok_new_cases"), Some(3.0));
}

#[test]
fn test_provider_metrics_survive_the_join() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    let combined = pipeline.combined("Tulsa").unwrap();

    assert_eq!(combined.value(day(10), "osdh_ok_cml_cases"), Some(20.0));
    assert_eq!(combined.value(day(10), "osdh_tul_cml_cases"), Some(12.0));
    assert_eq!(combined.value(day(12), "nyt_tul_cml_cases"), Some(12.0));
    assert_eq!(combined.value(day(4), "nyt_ok_new_cases"), Some(2.0));
    assert_eq!(combined.value(day(11), "ctp_ok_current_cases"), Some(28.0));
    assert_eq!(combined.value(day(2), "ctp_ok_current_cases"), None);
    assert_eq!(combined.value(day(8), "ctp_ok_7dr_cases"), None);
    assert_eq!(combined.value(day(9), "ctp_ok_7dr_cases"), Some(25.0 / 7.0));
}

#[test]
fn test_repeat_normalization_is_served_from_cache() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    let first = pipeline.normalized(Provider::Nyt, Some("Tulsa"), "nyt_tul").unwrap();
    let second = pipeline.normalized(Provider::Nyt, Some("Tulsa"), "nyt_tul").unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(client.reads("fixture://nyt"), 1);
}

#[test]
fn test_combining_twice_does_not_refetch() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    let first = pipeline.combined("Tulsa").unwrap();
    let reads = client.total_reads();
    let second = pipeline.combined("Tulsa").unwrap();

    // osdh and nyt twice each (statewide + county), ctp once
    assert_eq!(reads, 5);
    assert_eq!(client.total_reads(), 5);
    assert_eq!(pipeline.cache().len(), 5);
    assert_eq!(first, second);
}

#[test]
fn test_different_scopes_with_same_prefix_do_not_collide() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    let tulsa = pipeline.normalized(Provider::Osdh, Some("Tulsa"), "osdh_cty").unwrap();
    let cleveland = pipeline.normalized(Provider::Osdh, Some("Cleveland"), "osdh_cty").unwrap();

    assert!(!Rc::ptr_eq(&tulsa, &cleveland));
    assert_eq!(cleveland.len(), 1);
    assert_eq!(client.reads("fixture://osdh"), 2);
}

#[test]
fn test_unknown_scope_gives_empty_series() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    let osdh = pipeline.normalized(Provider::Osdh, Some("Atlantis"), "osdh_atl").unwrap();
    let nyt = pipeline.normalized(Provider::Nyt, Some("Atlantis"), "nyt_atl").unwrap();
    assert!(osdh.is_empty());
    assert!(nyt.is_empty());

    let combined = pipeline.combined("Atlantis").unwrap();
    assert_eq!(combined.len(), 12);
    assert!(
        combined
            .column("osdh_atl_cml_cases")
            .unwrap()
            .iter()
            .all(Option::is_none)
    );
}

#[test]
fn test_normalized_series_have_unique_dates() {
    let client = FixtureClient::all();
    let mut pipeline = Pipeline::new(&client, &settings());

    for provider in Provider::ALL {
        let series = pipeline
            .normalized(provider, None, &format!("{provider}_ok"))
            .unwrap();
        assert!(!series.is_empty());
        assert!(series.dates().windows(2).all(|w| w[0] < w[1]), "{provider}");
    }
}

#[test]
fn test_one_failing_provider_fails_the_combination() {
    let mut client = FixtureClient::all();
    client.files.remove("fixture://ctp");
    let mut pipeline = Pipeline::new(&client, &settings());

    let err = pipeline.combined("Tulsa").unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { location, .. } if location == "fixture://ctp"));
}
