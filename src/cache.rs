//! Memoization of normalized series for the lifetime of a pipeline.
//!
//! Entries are never evicted or refreshed; a pipeline is expected to live
//! for one interactive or batch session.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::Result;
use crate::series::DailySeries;
use crate::sources::Provider;

/// Identifies one normalization: provider, output prefix and scope filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: Provider,
    pub prefix: String,
    pub scope: Option<String>,
}

impl CacheKey {
    pub fn new(provider: Provider, prefix: &str, scope: Option<&str>) -> Self {
        Self {
            provider,
            prefix: prefix.to_string(),
            scope: scope.map(str::to_string),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.provider, self.prefix)?;
        if let Some(scope) = &self.scope {
            write!(f, "@{scope}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: HashMap<CacheKey, Rc<DailySeries>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored series for `key`, or runs `compute`, stores its
    /// result and returns that.
    ///
    /// A hit hands back the same `Rc` every time. Errors from `compute` are
    /// returned as-is and nothing is stored, so a later call retries.
    pub fn get_or_compute<F>(&mut self, key: CacheKey, compute: F) -> Result<Rc<DailySeries>>
    where
        F: FnOnce() -> Result<DailySeries>,
    {
        if let Some(hit) = self.entries.get(&key) {
            debug!(key = %key, "Series cache hit");
            return Ok(Rc::clone(hit));
        }

        debug!(key = %key, "Series cache miss");
        let series = Rc::new(compute()?);
        self.entries.insert(key, Rc::clone(&series));
        Ok(series)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Rc<DailySeries>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    #[test]
    fn test_hit_returns_same_series_without_recompute() {
        let mut cache = SeriesCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(DailySeries::default())
        };

        let key = CacheKey::new(Provider::Nyt, "nyt_ok", None);
        let first = cache.get_or_compute(key.clone(), compute).unwrap();
        let second = cache.get_or_compute(key, compute).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_scope_is_part_of_the_key() {
        let mut cache = SeriesCache::new();
        let tulsa = CacheKey::new(Provider::Osdh, "osdh_tul", Some("Tulsa"));
        let tulare = CacheKey::new(Provider::Osdh, "osdh_tul", Some("Tulare"));

        cache.get_or_compute(tulsa.clone(), || Ok(DailySeries::default())).unwrap();

        assert!(cache.contains(&tulsa));
        assert!(!cache.contains(&tulare));
        assert_eq!(tulsa.to_string(), "osdh-osdh_tul@Tulsa");
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = SeriesCache::new();
        let key = CacheKey::new(Provider::Ctp, "ctp_ok", None);

        let result = cache.get_or_compute(key.clone(), || {
            Err(Error::SourceUnavailable {
                location: "ctp".to_string(),
                reason: "offline".to_string(),
            })
        });

        assert!(result.is_err());
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }
}
