//! Chart views over the combined table and the renderers that draw them.
//!
//! Drawing itself belongs to an external tool; this module only decides
//! which columns go into which chart and hands them to a [`Renderer`].

use std::fs::{self, File};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::output::write_series_file;
use crate::pipeline::RegionPrefixes;
use crate::series::DailySeries;
use crate::sources::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Linear,
    Log,
}

/// One chart: a title, the columns plotted against date, and the y scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub title: String,
    pub columns: Vec<String>,
    pub scale: Scale,
}

impl ChartView {
    fn new(title: &str, columns: Vec<String>, scale: Scale) -> Self {
        Self {
            title: title.to_string(),
            columns,
            scale,
        }
    }

    /// File-name friendly form of the title.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.title.len());
        for c in self.title.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        }
        slug.trim_end_matches('_').to_string()
    }
}

/// The four standard views for a state and one of its sub-regions.
pub fn chart_views(prefixes: &RegionPrefixes) -> Vec<ChartView> {
    let every_series = |metric: &str| -> Vec<String> {
        [
            (Provider::Osdh, false),
            (Provider::Osdh, true),
            (Provider::Nyt, false),
            (Provider::Nyt, true),
            (Provider::Ctp, false),
        ]
        .into_iter()
        .map(|(provider, scoped)| format!("{}_{metric}", prefixes.prefix(provider, scoped)))
        .collect()
    };
    let active = [
        (Provider::Osdh, false),
        (Provider::Osdh, true),
        (Provider::Ctp, false),
    ]
    .into_iter()
    .map(|(provider, scoped)| format!("{}_current_cases", prefixes.prefix(provider, scoped)))
    .collect();

    vec![
        ChartView::new("Cumulative Cases", every_series("cml_cases"), Scale::Linear),
        ChartView::new("Cumulative Cases (log)", every_series("cml_cases"), Scale::Log),
        ChartView::new("Currently Active Cases", active, Scale::Linear),
        ChartView::new("New Cases (rolling)", every_series("7dr_cases"), Scale::Linear),
    ]
}

pub trait Renderer {
    /// Draws `view` from `table`, which holds only the view's columns.
    fn render(&mut self, view: &ChartView, table: &DailySeries) -> Result<()>;

    /// Called once after the last view.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Selects each view's columns from `table` and passes them to `renderer`.
///
/// Columns absent from `table` are dropped from that view with a warning.
pub fn present<R: Renderer + ?Sized>(
    table: &DailySeries,
    views: &[ChartView],
    renderer: &mut R,
) -> Result<()> {
    for view in views {
        let missing: Vec<&str> = view
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| table.column(c).is_none())
            .collect();
        if !missing.is_empty() {
            warn!(title = %view.title, ?missing, "Chart columns absent from table");
        }

        renderer.render(view, &table.select(&view.columns))?;
    }
    renderer.finish()
}

#[derive(Debug, Serialize)]
struct ManifestEntry {
    title: String,
    file: String,
    columns: Vec<String>,
    scale: Scale,
}

/// Writes each view as `<slug>.csv` in a directory, plus a `charts.json`
/// manifest describing titles, files, columns and scales.
pub struct CsvRenderer {
    dir: PathBuf,
    manifest: Vec<ManifestEntry>,
}

impl CsvRenderer {
    pub const MANIFEST: &'static str = "charts.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            manifest: Vec::new(),
        }
    }
}

impl Renderer for CsvRenderer {
    fn render(&mut self, view: &ChartView, table: &DailySeries) -> Result<()> {
        let file = format!("{}.csv", view.slug());
        write_series_file(&self.dir.join(&file), table, false)?;

        self.manifest.push(ManifestEntry {
            title: view.title.clone(),
            file,
            columns: table.column_names().map(str::to_string).collect(),
            scale: view.scale,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::MANIFEST);
        serde_json::to_writer_pretty(File::create(&path)?, &self.manifest)?;
        info!(path = %path.display(), charts = self.manifest.len(), "Chart manifest written");
        Ok(())
    }
}
