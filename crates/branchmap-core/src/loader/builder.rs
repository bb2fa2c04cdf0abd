// crates/branchmap-core/src/loader/builder.rs
use super::common_io;
use crate::error::Result;
use crate::model::{Dataset, CACHE_SUFFIX};

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

#[cfg(feature = "compact")]
use flate2::{write::GzEncoder, Compression};

// -----------------------------------------------------------------------------
// CONFIGURATION
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Gzip,
    None,
}

impl Default for CompressionMode {
    fn default() -> Self {
        #[cfg(feature = "compact")]
        {
            CompressionMode::Gzip
        }
        #[cfg(not(feature = "compact"))]
        {
            CompressionMode::None
        }
    }
}

// -----------------------------------------------------------------------------
// BUNDLE COMPILER
// -----------------------------------------------------------------------------

/// Parse a JSON source, validate it and write a compiled bincode bundle.
pub fn build_bundle(source_path: &Path, out_path: &Path, compression: CompressionMode) -> Result<Dataset> {
    info!(source = %source_path.display(), out = %out_path.display(), ?compression, "compiling bundle");
    let db = Dataset::load_json_file(source_path)?;
    write_bundle(out_path, &db, compression)?;
    Ok(db)
}

impl Dataset {
    /// **Smart Load:** uses the compiled bundle next to `path` when it is
    /// newer than the source, otherwise parses the source and refreshes it.
    pub fn load_cached(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let cache_path = common_io::get_cache_path(path, CACHE_SUFFIX);

        if is_cache_fresh(path, &cache_path) {
            match Self::load_binary_file(&cache_path) {
                Ok(db) => {
                    debug!(cache = %cache_path.display(), "bundle cache hit");
                    return Ok(db);
                }
                Err(e) => warn!(cache = %cache_path.display(), error = %e, "ignoring unreadable bundle"),
            }
        }

        let db = Self::load_json_file(path)?;
        // Best-effort: a read-only data dir just means no cache.
        if let Err(e) = write_bundle(&cache_path, &db, CompressionMode::default()) {
            warn!(cache = %cache_path.display(), error = %e, "could not write bundle cache");
        }
        Ok(db)
    }

    /// Read a compiled bundle (gzip or plain bincode).
    pub fn load_binary_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            crate::error::SelectorError::NotFound(format!("Bundle not found at {}: {}", path.display(), e))
        })?;
        Self::from_bundle_bytes(&bytes)
    }

    /// Decode bundle bytes and re-check the dataset invariants.
    pub fn from_bundle_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = common_io::open_bytes(bytes)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let db: Dataset = bincode::deserialize(&data)?;
        db.validate()?;
        Ok(db)
    }
}

fn is_cache_fresh(source_path: &Path, cache_path: &Path) -> bool {
    let cache_time = match fs::metadata(cache_path).and_then(|m| m.modified()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    match fs::metadata(source_path).and_then(|m| m.modified()) {
        Ok(source_time) => source_time <= cache_time,
        Err(_) => true,
    }
}

// -----------------------------------------------------------------------------
// GENERIC WRITER
// -----------------------------------------------------------------------------

fn write_bundle<T: serde::Serialize>(path: &Path, db: &T, compression: CompressionMode) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    let mut encoder: Box<dyn Write> = match compression {
        CompressionMode::Gzip => {
            #[cfg(feature = "compact")]
            {
                Box::new(GzEncoder::new(writer, Compression::default()))
            }
            #[cfg(not(feature = "compact"))]
            {
                return Err(crate::error::SelectorError::InvalidData(
                    "Gzip requested but 'compact' disabled".into(),
                ));
            }
        }
        CompressionMode::None => Box::new(writer),
    };

    bincode::serialize_into(&mut encoder, db)?;
    encoder.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectorError;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("branchmap-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn compiled_bundle_reads_back() {
        let dir = temp_dir("bundle");
        let src = dir.join("branches.json");
        fs::write(&src, r#"{ "Rajasthan": { "Ajmer": "addr1" } }"#).unwrap();
        let out = dir.join("branches.bin");

        let built = build_bundle(&src, &out, CompressionMode::None).unwrap();
        let loaded = Dataset::load_from_path(&out).unwrap();
        assert_eq!(built, loaded);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_cached_writes_cache_next_to_source() {
        let dir = temp_dir("cache");
        let src = dir.join("branches.json");
        fs::write(&src, r#"{ "Goa": {} }"#).unwrap();

        let first = Dataset::load_cached(&src).unwrap();
        assert!(common_io::get_cache_path(&src, CACHE_SUFFIX).exists());
        let second = Dataset::load_cached(&src).unwrap();
        assert_eq!(first, second);
        fs::remove_dir_all(&dir).ok();
    }

    fn raw_bundle(db: &Dataset) -> Vec<u8> {
        bincode::serialize(db).unwrap()
    }

    fn one_branch() -> Dataset {
        Dataset::from_json_str(r#"{ "Rajasthan": { "Ajmer": "addr1" } }"#).unwrap()
    }

    #[test]
    fn bundle_with_blank_address_is_rejected() {
        let mut db = one_branch();
        db.branches[0].address = "  ".into();

        let dir = temp_dir("blank-address");
        let out = dir.join("branches.bin");
        write_bundle(&out, &db, CompressionMode::None).unwrap();

        let err = Dataset::load_from_path(&out).unwrap_err();
        assert!(matches!(err, SelectorError::DataIntegrity(_)), "{err}");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn bundle_with_range_past_the_end_is_rejected() {
        let mut db = one_branch();
        db.regions[0].branches_len = 5;

        let err = Dataset::from_bundle_bytes(&raw_bundle(&db)).unwrap_err();
        assert!(matches!(err, SelectorError::DataIntegrity(_)), "{err}");
    }
}
