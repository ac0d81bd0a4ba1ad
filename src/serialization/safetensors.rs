//! `SafeTensors` reader and writer (F32 tensors only).
//!
//! File layout:
//! ```text
//! [8-byte header: u64 metadata length (little-endian)]
//! [JSON metadata: tensor names, dtypes, shapes, data_offsets,
//!  optional __metadata__ string map]
//! [Raw tensor data: F32 values in little-endian]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClasificarError, Result};

/// Metadata for a single tensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorMetadata {
    /// Data type of the tensor (always "F32" here).
    pub dtype: String,
    /// Shape of the tensor (e.g., `[n_features]` or `[rows, cols]`).
    pub shape: Vec<usize>,
    /// Data offsets `[start, end]` in the raw data section.
    pub data_offsets: [usize; 2],
}

/// Tensor metadata mapping. `BTreeMap` keeps JSON serialization
/// deterministic (sorted keys).
pub type SafeTensorsMetadata = BTreeMap<String, TensorMetadata>;

/// Arbitrary string→string metadata stored under `__metadata__`.
pub type UserMetadata = BTreeMap<String, String>;

/// Tensors staged for writing: name → (data, shape).
pub type TensorMap = BTreeMap<String, (Vec<f32>, Vec<usize>)>;

/// Saves tensors and user metadata to a `SafeTensors` file.
///
/// # Errors
///
/// Returns [`ClasificarError::Serialization`] if JSON encoding fails and
/// [`ClasificarError::Io`] if the file cannot be written.
pub fn save<P: AsRef<Path>>(
    path: P,
    tensors: &TensorMap,
    user_metadata: &UserMetadata,
) -> Result<()> {
    let mut header = serde_json::Map::new();

    if !user_metadata.is_empty() {
        let meta_obj: serde_json::Map<String, serde_json::Value> = user_metadata
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        header.insert(
            "__metadata__".to_string(),
            serde_json::Value::Object(meta_obj),
        );
    }

    let mut raw_data = Vec::new();
    let mut current_offset = 0;

    // BTreeMap iteration is already sorted by tensor name.
    for (name, (data, shape)) in tensors {
        let start_offset = current_offset;
        let end_offset = current_offset + data.len() * 4;

        let meta = TensorMetadata {
            dtype: "F32".to_string(),
            shape: shape.clone(),
            data_offsets: [start_offset, end_offset],
        };
        header.insert(name.clone(), serde_json::to_value(&meta)?);

        for &value in data {
            raw_data.extend_from_slice(&value.to_le_bytes());
        }
        current_offset = end_offset;
    }

    let metadata_json = serde_json::to_string(&serde_json::Value::Object(header))?;
    let metadata_bytes = metadata_json.as_bytes();

    let mut output = Vec::with_capacity(8 + metadata_bytes.len() + raw_data.len());
    output.extend_from_slice(&(metadata_bytes.len() as u64).to_le_bytes());
    output.extend_from_slice(metadata_bytes);
    output.extend_from_slice(&raw_data);

    fs::write(path, output)?;
    Ok(())
}

/// Loads a `SafeTensors` file.
///
/// # Returns
///
/// `(metadata, user_metadata, raw_data)` where `raw_data` is the tensor
/// payload section.
///
/// # Errors
///
/// Returns [`ClasificarError::Io`] if the file cannot be read and
/// [`ClasificarError::Serialization`] if the header or metadata is
/// malformed or truncated.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(SafeTensorsMetadata, UserMetadata, Vec<u8>)> {
    let bytes = fs::read(path)?;
    let metadata_len = read_header(&bytes)?;
    let (metadata, user_metadata) = parse_metadata(&bytes, metadata_len)?;
    let raw_data = bytes[8 + metadata_len..].to_vec();
    Ok((metadata, user_metadata, raw_data))
}

/// Extracts one tensor's F32 values from the raw data section.
///
/// # Errors
///
/// Returns [`ClasificarError::Serialization`] if the offsets fall outside
/// the data section or are not 4-byte aligned.
pub fn extract_tensor(raw_data: &[u8], meta: &TensorMetadata) -> Result<Vec<f32>> {
    let [start, end] = meta.data_offsets;
    if end < start || end > raw_data.len() {
        return Err(ClasificarError::Serialization(format!(
            "tensor data offsets [{start}, {end}] out of bounds (data length {})",
            raw_data.len()
        )));
    }
    let bytes = &raw_data[start..end];
    if bytes.len() % 4 != 0 {
        return Err(ClasificarError::Serialization(format!(
            "tensor byte length {} is not a multiple of 4",
            bytes.len()
        )));
    }

    let expected: usize = meta.shape.iter().product();
    let values: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    if values.len() != expected {
        return Err(ClasificarError::Serialization(format!(
            "tensor has {} values but shape {:?} implies {expected}",
            values.len(),
            meta.shape
        )));
    }
    Ok(values)
}

/// Validates the 8-byte header and returns the metadata length.
fn read_header(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < 8 {
        return Err(ClasificarError::Serialization(format!(
            "file too short for header: {} bytes",
            bytes.len()
        )));
    }
    let metadata_len = u64::from_le_bytes(bytes[..8].try_into().expect("checked length")) as usize;
    if 8 + metadata_len > bytes.len() {
        return Err(ClasificarError::Serialization(format!(
            "metadata length {metadata_len} exceeds file size {}",
            bytes.len()
        )));
    }
    Ok(metadata_len)
}

/// Splits the JSON header into tensor metadata and the `__metadata__` map.
fn parse_metadata(bytes: &[u8], metadata_len: usize) -> Result<(SafeTensorsMetadata, UserMetadata)> {
    let value: serde_json::Value = serde_json::from_slice(&bytes[8..8 + metadata_len])?;
    let serde_json::Value::Object(entries) = value else {
        return Err(ClasificarError::Serialization(
            "metadata header is not a JSON object".to_string(),
        ));
    };

    let mut metadata = SafeTensorsMetadata::new();
    let mut user_metadata = UserMetadata::new();
    for (key, entry) in entries {
        if key == "__metadata__" {
            user_metadata = serde_json::from_value(entry)?;
        } else {
            metadata.insert(key, serde_json::from_value(entry)?);
        }
    }
    Ok((metadata, user_metadata))
}
