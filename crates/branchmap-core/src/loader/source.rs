// crates/branchmap-core/src/loader/source.rs
use crate::error::{Result, SelectorError};
use crate::geometry::GeometryRequest;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Where boundary topology comes from.
///
/// Implementations return the raw document bytes; decoding happens in the
/// selector so every source reports parse failures the same way. Failures
/// should be [`SelectorError::DatasetLoad`] (or `NotFound`/`Io`, which the
/// selector treats the same).
pub trait GeometrySource {
    fn fetch(&self, request: &GeometryRequest) -> Result<Vec<u8>>;
}

/// Reads topology from a local directory laid out like the web root
/// (`<root>/india.json`, `<root>/states/<key>.json`). A `.gz` sibling is used
/// when the plain file is missing.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl GeometrySource for FileSource {
    fn fetch(&self, request: &GeometryRequest) -> Result<Vec<u8>> {
        let path = self.root.join(request.relative_path());
        let gz = path.with_extension("json.gz");
        let chosen = if path.exists() || !gz.exists() { path } else { gz };
        debug!(path = %chosen.display(), "reading topology");
        std::fs::read(&chosen).map_err(|e| {
            SelectorError::DatasetLoad(format!("cannot read {}: {e}", chosen.display()))
        })
    }
}

/// In-memory topology, keyed by request. Used for embedded maps and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<GeometryRequest, Vec<u8>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, request: GeometryRequest, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(request, bytes.into());
        self
    }
}

impl GeometrySource for StaticSource {
    fn fetch(&self, request: &GeometryRequest) -> Result<Vec<u8>> {
        self.documents.get(request).cloned().ok_or_else(|| {
            SelectorError::DatasetLoad(format!("no topology for {}", request.relative_path()))
        })
    }
}

/// Blocking HTTP source (`fetch` feature). No timeout is imposed; a
/// non-success status is a load failure.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[cfg(feature = "fetch")]
impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

#[cfg(feature = "fetch")]
impl GeometrySource for HttpSource {
    fn fetch(&self, request: &GeometryRequest) -> Result<Vec<u8>> {
        let url = request.path_under(&self.base_url);
        debug!(%url, "fetching topology");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SelectorError::DatasetLoad(format!("fetch error: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SelectorError::DatasetLoad(format!("HTTP {status} for {url}")));
        }
        let bytes = resp
            .bytes()
            .map_err(|e| SelectorError::DatasetLoad(format!("read error: {e}")))?;
        Ok(bytes.to_vec())
    }
}
