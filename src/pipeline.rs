//! Fetch, normalize and combine all providers into one wide daily table.

use std::rc::Rc;

use tracing::info;

use crate::cache::{CacheKey, SeriesCache};
use crate::config::{Settings, scope_code};
use crate::error::Result;
use crate::fetch::{HttpClient, fetch_table};
use crate::series::DailySeries;
use crate::series::calendar::{align, outer_join};
use crate::sources::{Provider, SourceRegistry};

/// Region codes that namespace column prefixes: `{provider}_{code}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPrefixes {
    pub state: String,
    pub scope: String,
}

impl RegionPrefixes {
    pub fn new(state_code: &str, scope_code: &str) -> Self {
        Self {
            state: state_code.to_string(),
            scope: scope_code.to_string(),
        }
    }

    /// Prefix for `provider`'s statewide (`scoped == false`) or sub-region
    /// series.
    pub fn prefix(&self, provider: Provider, scoped: bool) -> String {
        let code = if scoped { &self.scope } else { &self.state };
        format!("{}_{code}", provider.id())
    }
}

/// Owns the HTTP client, the provider sources and the series cache.
pub struct Pipeline<C> {
    client: C,
    sources: SourceRegistry,
    cache: SeriesCache,
    state_code: String,
}

impl<C: HttpClient> Pipeline<C> {
    pub fn new(client: C, settings: &Settings) -> Self {
        Self {
            client,
            sources: SourceRegistry::new(settings),
            cache: SeriesCache::new(),
            state_code: settings.state_code.clone(),
        }
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub fn prefixes(&self, scope_code: &str) -> RegionPrefixes {
        RegionPrefixes::new(&self.state_code, scope_code)
    }

    /// Normalized series for `provider`, fetched at most once per
    /// `(provider, prefix, scope)` for the life of this pipeline.
    ///
    /// The returned series is shared with the cache and must be treated as
    /// read-only.
    #[tracing::instrument(skip(self))]
    pub fn normalized(
        &mut self,
        provider: Provider,
        scope: Option<&str>,
        prefix: &str,
    ) -> Result<Rc<DailySeries>> {
        let key = CacheKey::new(provider, prefix, scope);
        let source = self.sources.get(provider);
        let client = &self.client;

        self.cache.get_or_compute(key, || {
            let raw = fetch_table(client, source)?;
            source.normalize(&raw, scope, prefix)
        })
    }

    /// [`Pipeline::combined_with_code`] using the default code for `scope`.
    pub fn combined(&mut self, scope: &str) -> Result<DailySeries> {
        self.combined_with_code(scope, &scope_code(scope))
    }

    /// Every provider's statewide series, plus its `scope` series where the
    /// provider has a sub-region breakdown, joined on date and filled to a
    /// contiguous daily calendar.
    ///
    /// Fails if any single provider fails.
    #[tracing::instrument(skip(self))]
    pub fn combined_with_code(&mut self, scope: &str, code: &str) -> Result<DailySeries> {
        let prefixes = self.prefixes(code);
        let mut per_provider = Vec::with_capacity(Provider::ALL.len());

        for provider in Provider::ALL {
            let statewide = self.normalized(provider, None, &prefixes.prefix(provider, false))?;
            let joined = if self.sources.get(provider).scope_column().is_some() {
                let scoped =
                    self.normalized(provider, Some(scope), &prefixes.prefix(provider, true))?;
                outer_join(&statewide, &scoped)?
            } else {
                DailySeries::clone(&statewide)
            };
            per_provider.push(joined);
        }

        let parts: Vec<&DailySeries> = per_provider.iter().collect();
        let combined = align(&parts)?;

        info!(
            scope,
            rows = combined.len(),
            columns = combined.columns().len(),
            first = ?combined.first_date(),
            last = ?combined.last_date(),
            "Combined provider series"
        );
        Ok(combined)
    }
}
