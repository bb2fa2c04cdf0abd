// crates/branchmap-core/src/loader/common_io.rs
use crate::error::{Result, SelectorError};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "compact")]
use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Opens a file, buffers it, and unwraps gzip when the stream starts with the
/// gzip magic bytes. Callers never care about the compression.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        SelectorError::NotFound(format!("Dataset not found at {}: {}", path.display(), e))
    })?;
    wrap_reader(BufReader::new(file))
}

/// Same as [`open_stream`] for bytes already in memory (fetched topology).
pub fn open_bytes(bytes: &[u8]) -> Result<Box<dyn Read + '_>> {
    wrap_reader(BufReader::new(bytes))
}

fn wrap_reader<'a, R: BufRead + 'a>(mut reader: R) -> Result<Box<dyn Read + 'a>> {
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if !gzipped {
        return Ok(Box::new(reader));
    }

    #[cfg(feature = "compact")]
    {
        Ok(Box::new(GzDecoder::new(reader)))
    }

    #[cfg(not(feature = "compact"))]
    {
        Err(SelectorError::InvalidData(
            "gzip input but 'compact' disabled".into(),
        ))
    }
}

/// `data/branches.json` -> `data/branches.json.comp.bin`
pub fn get_cache_path(source_path: &Path, suffix: &str) -> PathBuf {
    let filename = source_path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_owned());
    source_path.with_file_name(format!("{filename}.{suffix}"))
}
