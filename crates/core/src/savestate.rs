//! Save states for the peripheral set.
//!
//! Captures every device register (cycle snapshots, transmit timers and
//! queued serial input included) using bincode serialization with deflate
//! compression. Output callbacks are host wiring and are not saved.
//!
//! ## Format
//!
//! ```text
//! +------------------+
//! | Magic "H8SD"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```

use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::peripherals::{SerialState, TimersState};

/// Magic bytes identifying a save state image.
const MAGIC: &[u8; 4] = b"H8SD";
/// Current save state format version.
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    /// Cycle count when the state was captured
    pub cycles: u64,
    pub timers: TimersState,
    pub serial_ports: Vec<SerialState>,
}

/// Encode a save state into a header + compressed payload image.
pub fn encode(state: &SaveState) -> Result<Vec<u8>, String> {
    let payload = bincode::serialize(state)
        .map_err(|e| format!("Serialize error: {}", e))?;

    let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decode an image produced by [`encode`], verifying magic and version.
pub fn decode(data: &[u8]) -> Result<SaveState, String> {
    if data.len() < HEADER_LEN {
        return Err("Save state too small".into());
    }
    if &data[0..4] != MAGIC {
        return Err("Invalid save state (bad magic)".into());
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(format!("Unsupported save state version {} (expected {})",
            version, FORMAT_VERSION));
    }

    let decompressed = miniz_oxide::inflate::decompress_to_vec(&data[HEADER_LEN..])
        .map_err(|e| format!("Decompress error: {:?}", e))?;

    bincode::deserialize(&decompressed)
        .map_err(|e| format!("Deserialize error: {}", e))
}

pub fn save_to_file(state: &SaveState, path: &Path) -> Result<(), String> {
    let out = encode(state)?;
    std::fs::write(path, &out)
        .map_err(|e| format!("Write error: {}", e))
}

pub fn load_from_file(path: &Path) -> Result<SaveState, String> {
    let data = std::fs::read(path)
        .map_err(|e| format!("Read error: {}", e))?;
    decode(&data)
}
