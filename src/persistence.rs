//! Camera-state persistence.
//!
//! The record is a single key holding a column-major 4x4 transform encoded as
//! a JSON array of 16 numbers. Reads never fail loudly: any error means "no
//! prior state". Writes are best-effort.

use anyhow::{Context, Result};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Number of values in a serialized transform
pub const TRANSFORM_LEN: usize = 16;

/// Persisted scene state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
    pub camera_position: Option<String>,
}

impl SceneState {
    pub fn new(serialized: impl Into<String>) -> Self {
        Self {
            camera_position: Some(serialized.into()),
        }
    }

    /// Decode the stored transform, if any
    pub fn transform(&self) -> Option<Result<Mat4, SceneStateError>> {
        self.camera_position.as_deref().map(parse_transform)
    }
}

/// Persisted state that does not describe a valid 4x4 matrix
#[derive(Error, Debug, PartialEq)]
pub enum SceneStateError {
    #[error("camera state is not a JSON number array: {0}")]
    NotAnArray(String),

    #[error("camera state has {0} values, expected 16")]
    WrongLength(usize),

    #[error("camera state value at index {0} is not finite")]
    NonFinite(usize),
}

/// Encode a transform as a flat JSON array (column-major)
pub fn serialize_transform(matrix: &Mat4) -> String {
    let values = matrix.to_cols_array();
    // Serializing a plain f32 array cannot fail
    serde_json::to_string(&values.to_vec()).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a flat JSON array into a transform, enforcing exactly 16 finite values
pub fn parse_transform(text: &str) -> Result<Mat4, SceneStateError> {
    let values: Vec<f64> =
        serde_json::from_str(text).map_err(|e| SceneStateError::NotAnArray(e.to_string()))?;

    if values.len() != TRANSFORM_LEN {
        return Err(SceneStateError::WrongLength(values.len()));
    }

    let mut cols = [0.0f32; TRANSFORM_LEN];
    for (i, value) in values.iter().enumerate() {
        let v = *value as f32;
        if !v.is_finite() {
            return Err(SceneStateError::NonFinite(i));
        }
        cols[i] = v;
    }

    Ok(Mat4::from_cols_array(&cols))
}

/// Durable key/value store for the camera record
pub trait CameraStore {
    /// Last saved state, or `None` when absent or unreadable
    fn get_camera_state(&self) -> Option<SceneState>;

    /// Overwrite the saved state
    fn set_camera_state(&self, serialized: &str) -> Result<()>;
}

/// On-disk layout of the state file
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateRecord {
    camera_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,
}

/// Stores the record as a small JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> Result<StateRecord> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read camera state: {:?}", self.path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse camera state: {:?}", self.path))
    }
}

impl CameraStore for JsonFileStore {
    fn get_camera_state(&self) -> Option<SceneState> {
        if !self.path.exists() {
            log::debug!("No camera state at {:?}", self.path);
            return None;
        }

        match self.read_record() {
            Ok(record) => Some(SceneState {
                camera_position: record.camera_position,
            }),
            Err(e) => {
                log::warn!("Ignoring camera state: {:#}", e);
                None
            }
        }
    }

    fn set_camera_state(&self, serialized: &str) -> Result<()> {
        let record = StateRecord {
            camera_position: Some(serialized.to_string()),
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        let text = serde_json::to_string_pretty(&record)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        // Write then rename; readers never see a partial record
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).with_context(|| format!("Failed to write: {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace camera state: {:?}", self.path))?;

        Ok(())
    }
}

/// Keeps the record in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryRecord>,
}

#[derive(Debug, Default)]
struct MemoryRecord {
    value: Option<String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(serialized: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(MemoryRecord {
                value: Some(serialized.into()),
                writes: 0,
            }),
        }
    }

    fn record(&self) -> std::sync::MutexGuard<'_, MemoryRecord> {
        // The record stays consistent even if a writer panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.record().writes
    }

    pub fn raw(&self) -> Option<String> {
        self.record().value.clone()
    }
}

impl CameraStore for MemoryStore {
    fn get_camera_state(&self) -> Option<SceneState> {
        self.record().value.clone().map(SceneState::new)
    }

    fn set_camera_state(&self, serialized: &str) -> Result<()> {
        let mut record = self.record();
        record.value = Some(serialized.to_string());
        record.writes += 1;
        Ok(())
    }
}
