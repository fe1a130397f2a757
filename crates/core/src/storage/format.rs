use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::watchlist::Watchlist;

/// Current store file version.
pub const CURRENT_VERSION: u16 = 1;

/// On-disk layout of a watchlist store file.
///
/// ```json
/// { "version": 1, "watchlists": [ { "name": "All Symbols", "is_default": true, "id": 1 } ] }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u16,
    pub watchlists: Vec<Watchlist>,
}

/// Serialize watchlists into a versioned JSON document.
pub fn write_document(watchlists: &[Watchlist]) -> Result<Vec<u8>, CoreError> {
    let doc = StoreDocument {
        version: CURRENT_VERSION,
        watchlists: watchlists.to_vec(),
    };
    serde_json::to_vec_pretty(&doc)
        .map_err(|e| CoreError::Persistence(format!("Failed to serialize watchlists: {e}")))
}

/// Parse a store file, rejecting unknown versions.
pub fn read_document(data: &[u8]) -> Result<Vec<Watchlist>, CoreError> {
    let doc: StoreDocument = serde_json::from_slice(data)
        .map_err(|e| CoreError::InvalidStoreFile(e.to_string()))?;

    if doc.version == 0 || doc.version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(doc.version));
    }

    Ok(doc.watchlists)
}
