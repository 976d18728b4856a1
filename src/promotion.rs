//! Asset Promotion Pipeline
//!
//! Moves staged uploads from temporary, session-scoped storage to permanent,
//! design-scoped storage and rewrites layer content to the permanent form.
//! Promotion is best-effort per layer: one failure is logged and reported,
//! the layer keeps its staged reference, and the save continues. No
//! transaction spans layers; partial success is a terminal state.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::content::LayerContent;
use crate::model::DesignSession;

#[derive(Debug, Error)]
pub enum PromotionError {
    /// Already promoted or already swept. Promotion of a gone temp file
    /// fails cleanly without touching the layer.
    #[error("temporary file missing: {0}")]
    TempMissing(PathBuf),

    #[error("failed to move {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionFailure {
    pub layer_id: String,
    pub reason: String,
}

/// Outcome of one save's promotion pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionReport {
    /// Layer ids whose content was rewritten to permanent form.
    pub promoted: Vec<String>,
    pub failed: Vec<PromotionFailure>,
    /// Binary-carrying layers that needed no promotion (remote, inline,
    /// already permanent).
    pub skipped: usize,
}

impl PromotionReport {
    pub fn fully_promoted(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of a temporary-storage sweep.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub removed: Vec<String>,
    pub kept: usize,
}

pub struct PromotionPipeline {
    temp_root: PathBuf,
    perm_root: PathBuf,
}

impl PromotionPipeline {
    pub fn new(temp_root: impl Into<PathBuf>, perm_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
            perm_root: perm_root.into(),
        }
    }

    /// Promotes every staged binary-carrying layer in the session.
    ///
    /// Each layer is an independent unit of work: a failure logs a warning,
    /// lands in the report, and leaves that layer's content unchanged.
    pub fn promote_session(
        &self,
        session: &mut DesignSession,
        owner_id: &str,
        design_id: &str,
    ) -> PromotionReport {
        let mut report = PromotionReport::default();

        for layer in &mut session.layers {
            if !layer.kind.carries_binary() {
                continue;
            }
            let (temp_path, original_file_name) = match &layer.content {
                LayerContent::Staged {
                    temp_path,
                    original_file_name,
                    ..
                } => (temp_path.clone(), original_file_name.clone()),
                _ => {
                    report.skipped += 1;
                    continue;
                }
            };

            let ext = extension_for(&temp_path, original_file_name.as_deref());
            let file_name = format!("{}.{}", layer.id, ext);
            let dest_rel = format!("{}/{}/{}", owner_id, design_id, file_name);

            match self.promote_file(&temp_path, &dest_rel) {
                Ok(content_hash) => {
                    layer.content = LayerContent::Permanent {
                        file_path: format!("/{dest_rel}"),
                        content_hash: Some(content_hash),
                    };
                    report.promoted.push(layer.id.clone());
                }
                Err(err) => {
                    log::warn!(
                        "promotion failed for layer {} ({}): {err}",
                        layer.id,
                        temp_path
                    );
                    report.failed.push(PromotionFailure {
                        layer_id: layer.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Moves one temp file into permanent storage, returning the sha256 of
    /// its bytes.
    fn promote_file(&self, temp_path: &str, dest_rel: &str) -> Result<String, PromotionError> {
        let src = self.temp_root.join(temp_path.trim_start_matches('/'));
        if !src.is_file() {
            return Err(PromotionError::TempMissing(src));
        }

        let bytes = fs::read(&src).map_err(|source| PromotionError::Io {
            path: src.clone(),
            source,
        })?;

        let dest = self.perm_root.join(dest_rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| PromotionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&dest, &bytes).map_err(|source| PromotionError::Io {
            path: dest.clone(),
            source,
        })?;

        // The copy is durable; a failed cleanup only leaves the sweep more
        // to do.
        if let Err(err) = fs::remove_file(&src) {
            log::warn!("promoted but could not remove temp file {}: {err}", src.display());
        }

        Ok(sha256_hex(&bytes))
    }
}

/// Deletes temporary session directories older than `max_age`, regardless of
/// promotion status. Garbage collection for abandoned uploads; a missing
/// temp root sweeps nothing.
pub fn sweep_stale(temp_root: &Path, max_age: Duration) -> std::io::Result<SweepReport> {
    let mut report = SweepReport::default();
    if !temp_root.is_dir() {
        return Ok(report);
    }

    let now = Utc::now();
    for entry in fs::read_dir(temp_root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let modified: DateTime<Utc> = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t.into(),
            Err(err) => {
                log::warn!("sweep: cannot stat {}: {err}", path.display());
                report.kept += 1;
                continue;
            }
        };

        if now - modified > max_age {
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    log::info!("sweep: removed stale session {}", path.display());
                    report
                        .removed
                        .push(entry.file_name().to_string_lossy().into_owned());
                }
                Err(err) => {
                    log::warn!("sweep: failed to remove {}: {err}", path.display());
                    report.kept += 1;
                }
            }
        } else {
            report.kept += 1;
        }
    }

    Ok(report)
}

fn extension_for(temp_path: &str, original_file_name: Option<&str>) -> String {
    original_file_name
        .and_then(|n| n.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .or_else(|| {
            Path::new(temp_path)
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "bin".to_string())
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
