use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::integrity::{IntegrityPolicy, IntegrityReport};
use super::model::Network;
use super::parse::parse_network_document;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read network file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed compressed network stream")]
    Decode(#[source] std::io::Error),
    #[error("network payload is not a valid network document")]
    Parse(#[source] serde_json::Error),
    #[error("network has dangling references: {0}")]
    Integrity(IntegrityReport),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    pub integrity: IntegrityPolicy,
}

pub fn is_compressed(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

fn decompress(bytes: &[u8]) -> Result<Vec<u8>, LoadError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut inflated = Vec::with_capacity(bytes.len().saturating_mul(4));
    decoder
        .read_to_end(&mut inflated)
        .map_err(LoadError::Decode)?;
    Ok(inflated)
}

/// Decodes a gzip-compressed or raw JSON network and validates it.
pub fn decode_network(bytes: &[u8], options: &LoadOptions) -> Result<Network, LoadError> {
    let json = if is_compressed(bytes) {
        Cow::Owned(decompress(bytes)?)
    } else {
        Cow::Borrowed(bytes)
    };

    let builder = parse_network_document(&json)
        .and_then(|document| document.into_builder())
        .map_err(LoadError::Parse)?;
    let (network, report) = builder
        .build_with(options.integrity)
        .map_err(LoadError::Integrity)?;

    if !report.is_ok() {
        tracing::warn!(
            problems = report.problem_count(),
            "pruned dangling references: {report}"
        );
    }

    let totals = network.totals();
    tracing::info!(
        cells = totals.cells,
        synapses = totals.synapses,
        excitatory = totals.excitatory,
        inhibitory = totals.inhibitory,
        neutral = totals.neutral,
        compressed = is_compressed(bytes),
        "network decoded"
    );

    Ok(network)
}

pub fn load_network(path: &Path, options: &LoadOptions) -> Result<Network, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_network(&bytes, options)
}
