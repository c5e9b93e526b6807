use crate::error::Result;

/// Blocking byte source behind every provider fetch.
///
/// `location` is whatever the provider is configured with: usually an
/// `http(s)://` URL, but implementations may accept local paths too.
pub trait HttpClient {
    fn get(&self, location: &str) -> Result<Vec<u8>>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(&self, location: &str) -> Result<Vec<u8>> {
        (**self).get(location)
    }
}
