use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

/// A normalized document bound to the file it is published as.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub path: PathBuf,
    pub body: Value,
    /// What the success log reports as the item count.
    pub items: usize,
}

impl Artifact {
    pub fn new<T: Serialize>(
        path: impl Into<PathBuf>,
        document: &T,
        items: usize,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.into(),
            body: serde_json::to_value(document).context("Failed to serialize document")?,
            items,
        })
    }

    /// Writes pretty-printed JSON next to the target and renames it over the
    /// target, so readers never observe a half-written file.
    pub async fn write(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut bytes = serde_json::to_vec_pretty(&self.body)?;
        bytes.push(b'\n');

        let tmp = tmp_path(&self.path);
        let written = match tokio::fs::write(&tmp, &bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path)
                .await
                .with_context(|| format!("Failed to move {} into place", self.path.display())),
            Err(err) => {
                Err(anyhow::Error::new(err).context(format!("Failed to write {}", tmp.display())))
            }
        };

        if written.is_err() {
            if let Err(err) = tokio::fs::remove_file(&tmp).await {
                tracing::debug!("Could not remove {}: {err}", tmp.display());
            }
        }
        written
    }
}

pub async fn read(path: &Path) -> anyhow::Result<Value> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
