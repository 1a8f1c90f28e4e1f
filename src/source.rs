// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Run log sources: local files, remote URLs and in-memory text
//!
//! Fetching is the only fallible step of a dashboard load. [`load_log_text`]
//! turns any failure into an empty (or sample) log plus a [`LoadStatus`]
//! describing what happened.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::FallbackMode;
use crate::logging::AppLogger;

/// Run log bundled with the crate, used by [`FallbackMode::Sample`]
pub const SAMPLE_CSV: &str = include_str!("../data/sample_runs.csv");

#[async_trait]
pub trait RunLogSource: Send + Sync {
    /// Fetch the full CSV text
    async fn fetch_text(&self) -> Result<String, FetchError>;

    /// Human-readable location for logs and status reports
    fn describe(&self) -> String;
}

/// Errors raised while obtaining the raw run log
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to fetch data: {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid source location: {0}")]
    InvalidLocation(String),
}

/// A CSV file on the local filesystem
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RunLogSource for FileSource {
    async fn fetch_text(&self) -> Result<String, FetchError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.display().to_string(),
                source,
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A CSV document served over HTTP(S)
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl RunLogSource for HttpSource {
    async fn fetch_text(&self) -> Result<String, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// CSV text already held in memory
pub struct StaticSource {
    name: String,
    text: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn sample() -> Self {
        Self::new("bundled sample", SAMPLE_CSV)
    }
}

#[async_trait]
impl RunLogSource for StaticSource {
    async fn fetch_text(&self) -> Result<String, FetchError> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Pick a source implementation for a configured location
///
/// `http`/`https` URLs are fetched remotely, `file` URLs and everything else
/// are read as local paths.
pub fn create_source(location: &str, timeout: Duration) -> Result<Box<dyn RunLogSource>, FetchError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(FetchError::InvalidLocation("empty location".to_string()));
    }

    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            Ok(Box::new(HttpSource::new(url, timeout)?))
        }
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(|path| Box::new(FileSource::new(path)) as Box<dyn RunLogSource>)
            .map_err(|_| FetchError::InvalidLocation(location.to_string())),
        _ => Ok(Box::new(FileSource::new(location))),
    }
}

/// Outcome of obtaining the raw log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded { source: String, bytes: usize },
    /// The fetch failed and the bundled sample was used instead
    Fallback { reason: String },
    /// The fetch failed and the log is empty
    Failed { reason: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Raw log text paired with how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedLog {
    pub text: String,
    pub status: LoadStatus,
}

/// Fetch the log, substituting the fallback on any failure
pub async fn load_log_text(source: &dyn RunLogSource, fallback: FallbackMode) -> LoadedLog {
    let description = source.describe();
    let started = Instant::now();

    match source.fetch_text().await {
        Ok(text) => {
            AppLogger::log_fetch(&description, text.len(), started.elapsed().as_millis() as u64);
            LoadedLog {
                status: LoadStatus::Loaded {
                    source: description,
                    bytes: text.len(),
                },
                text,
            }
        }
        Err(e) => {
            let reason = e.to_string();
            AppLogger::log_fetch_failure(&description, &reason, fallback);
            match fallback {
                FallbackMode::Empty => LoadedLog {
                    text: String::new(),
                    status: LoadStatus::Failed { reason },
                },
                FallbackMode::Sample => LoadedLog {
                    text: StaticSource::sample().text,
                    status: LoadStatus::Fallback { reason },
                },
            }
        }
    }
}
