// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Concurrent overlay loading.
//!
//! Every source is fetched and parsed in its own task. Failures are isolated:
//! a source that cannot be read or parsed is reported and skipped, and the
//! rest keep loading. Results arrive in completion order, not list order.

use std::fmt;
use std::path::PathBuf;

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::document::{OverlayDocument, ParseError};
use crate::source::OverlaySource;

/// Where overlay files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRoot {
    /// Base URL; file identifiers are appended as path segments.
    Http(String),
    /// Local directory.
    Directory(PathBuf),
}

impl DataRoot {
    /// Interpret a configured root. Anything that is not an `http(s)://`
    /// URL is treated as a directory path.
    #[must_use]
    pub fn new(root: &str) -> Self {
        if root.starts_with("http://") || root.starts_with("https://") {
            Self::Http(root.trim_end_matches('/').to_string())
        } else {
            Self::Directory(PathBuf::from(root))
        }
    }

    /// Human-readable location of `file` under this root.
    #[must_use]
    pub fn locate(&self, file: &str) -> String {
        match self {
            Self::Http(base) => format!("{base}/{file}"),
            Self::Directory(dir) => dir.join(file).display().to_string(),
        }
    }
}

impl fmt::Display for DataRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(base) => f.write_str(base),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Why an overlay could not be loaded. None of these are fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LoadError {
    /// Transport failures (HTTP status, network, disk) as opposed to bad content.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Parse(_))
    }
}

/// Totals for one load pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failed: usize,
}

/// Progress reported by a load pass, one event per source plus a final summary.
#[derive(Debug)]
pub enum LoadEvent {
    Loaded {
        source: OverlaySource,
        document: OverlayDocument,
    },
    Failed {
        source: OverlaySource,
        error: LoadError,
    },
    Finished(LoadSummary),
}

/// Fetches and parses overlay files from one data root.
#[derive(Debug, Clone)]
pub struct Loader {
    root: DataRoot,
    client: reqwest::Client,
}

impl Loader {
    pub fn new(root: DataRoot) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(root, client))
    }

    #[must_use]
    pub fn with_client(root: DataRoot, client: reqwest::Client) -> Self {
        Self { root, client }
    }

    #[must_use]
    pub fn root(&self) -> &DataRoot {
        &self.root
    }

    /// Raw text of `file` under the data root.
    pub async fn fetch_text(&self, file: &str) -> Result<String, LoadError> {
        match &self.root {
            DataRoot::Http(_) => {
                let url = self.root.locate(file);
                let response = self.client.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status { url, status });
                }
                Ok(response.text().await?)
            }
            DataRoot::Directory(dir) => {
                let path = dir.join(file);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| LoadError::Io { path, source })
            }
        }
    }

    /// Fetch and parse one source.
    pub async fn load(&self, source: &OverlaySource) -> Result<OverlayDocument, LoadError> {
        let text = self.fetch_text(&source.file).await?;
        let document = OverlayDocument::parse(&text)?;
        debug!(
            "Parsed {} features from {}",
            document.len(),
            self.root.locate(&source.file)
        );
        Ok(document)
    }

    /// Load every source concurrently, handing each result to `sink` as soon
    /// as it completes. The final [`LoadEvent::Finished`] is not sent to
    /// `sink`; the totals are returned instead.
    pub async fn load_all<F>(&self, sources: Vec<OverlaySource>, mut sink: F) -> LoadSummary
    where
        F: FnMut(LoadEvent),
    {
        let mut tasks = JoinSet::new();
        for source in sources {
            let loader = self.clone();
            tasks.spawn(async move {
                let result = loader.load(&source).await;
                (source, result)
            });
        }

        let mut summary = LoadSummary::default();
        while let Some(joined) = tasks.join_next().await {
            let event = match joined {
                Ok((source, Ok(document))) => {
                    summary.loaded += 1;
                    info!("Loaded overlay '{}' ({} features)", source.label, document.len());
                    LoadEvent::Loaded { source, document }
                }
                Ok((source, Err(error))) => {
                    summary.failed += 1;
                    warn!(
                        "Skipping overlay '{}' from {}: {}",
                        source.label,
                        self.root.locate(&source.file),
                        error
                    );
                    LoadEvent::Failed { source, error }
                }
                Err(e) => {
                    summary.failed += 1;
                    error!("Overlay load task did not complete: {e}");
                    continue;
                }
            };
            sink(event);
        }

        summary
    }

    /// Run [`Self::load_all`] on a dedicated thread with its own tokio
    /// runtime. `notify` is called after every event is queued, so the UI
    /// can request a repaint.
    pub fn spawn_background<F>(
        self,
        sources: Vec<OverlaySource>,
        notify: F,
    ) -> mpsc::UnboundedReceiver<LoadEvent>
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        info!("Loading {} overlays from {}", sources.len(), self.root);

        let spawned = std::thread::Builder::new()
            .name("overlay-loader".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Runtime::new() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("Failed to start overlay loader runtime: {e}");
                        return;
                    }
                };

                runtime.block_on(async {
                    let send = |event: LoadEvent| {
                        if tx.send(event).is_ok() {
                            notify();
                        } else {
                            debug!("Overlay event dropped, receiver closed");
                        }
                    };
                    let summary = self.load_all(sources, &send).await;
                    info!(
                        "Overlay loading finished: {} loaded, {} failed",
                        summary.loaded, summary.failed
                    );
                    send(LoadEvent::Finished(summary));
                });
            });

        if let Err(e) = spawned {
            error!("Failed to spawn overlay loader thread: {e}");
        }

        rx
    }
}
