use super::client::HttpClient;
use crate::error::{Error, Result};

/// Fetches `http(s)://` locations with a blocking reqwest client and reads
/// anything else from the local filesystem.
pub struct BasicClient(reqwest::blocking::Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::SourceUnavailable {
                location: "http client".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self(client))
    }
}

impl HttpClient for BasicClient {
    fn get(&self, location: &str) -> Result<Vec<u8>> {
        let unavailable = |reason: String| Error::SourceUnavailable {
            location: location.to_string(),
            reason,
        };

        if !location.starts_with("http") {
            return std::fs::read(location).map_err(|e| unavailable(e.to_string()));
        }

        let resp = self
            .0
            .get(location)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;
        let bytes = resp.bytes().map_err(|e| unavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
