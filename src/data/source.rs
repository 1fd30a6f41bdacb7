//! Where the point dataset comes from
//!
//! Loading is the only asynchronous step of initialization. Every failure
//! (missing file, HTTP error, malformed document) surfaces as
//! [`MapError::DatasetLoad`].

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::path::PathBuf;

use crate::{
    data::geojson::{parse_dataset, Dataset},
    MapError, Result,
};

/// Shared async HTTP client for dataset downloads
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("quakemap/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("failed to build reqwest async client")
});

#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human readable origin, used in logs and errors
    fn name(&self) -> String;

    /// Retrieves the raw GeoJSON text.
    async fn fetch(&self) -> Result<String>;

    /// Retrieves and validates the dataset.
    async fn load(&self, weight_properties: &[String]) -> Result<Dataset> {
        let text = self.fetch().await?;
        parse_dataset(&text, &self.name(), weight_properties)
    }
}

/// Reads a GeoJSON file from disk.
#[derive(Debug, Clone)]
pub struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileDatasetSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| MapError::dataset(self.name(), e))
    }
}

/// Downloads a GeoJSON document.
#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    url: String,
}

impl HttpDatasetSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String> {
        let resp = HTTP_CLIENT
            .get(&self.url)
            .send()
            .await
            .map_err(|e| MapError::dataset(self.name(), e))?;
        if !resp.status().is_success() {
            return Err(MapError::dataset(self.name(), format!("HTTP {}", resp.status())));
        }
        resp.text().await.map_err(|e| MapError::dataset(self.name(), e))
    }
}

/// Dataset already held in memory.
#[derive(Debug, Clone)]
pub struct StaticDatasetSource {
    name: String,
    text: String,
}

impl StaticDatasetSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl DatasetSource for StaticDatasetSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn fetch(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Picks a file or HTTP source from a location string.
pub fn source_for(location: &str) -> Box<dyn DatasetSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpDatasetSource::new(location))
    } else {
        Box::new(FileDatasetSource::new(location))
    }
}
