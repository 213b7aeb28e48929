//! Compiled contract artifacts.
//!
//! Compilation happens elsewhere; this module only reads the hardhat artifact JSON
//! (`artifacts/contracts/<File>.sol/<Name>.json`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// A compiled contract: its ABI and creation bytecode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    #[serde(default)]
    pub abi: Value,
    /// Creation bytecode, `0x`-prefixed hex.
    pub bytecode: String,
}

impl ContractArtifact {
    /// Locate and load the artifact for `name` anywhere under `artifacts_dir`.
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self> {
        let path = find_artifact(artifacts_dir, name)?.with_context(|| {
            format!(
                "No artifact named {name}.json under {}",
                artifacts_dir.display()
            )
        })?;

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let artifact: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        tracing::debug!(name, path = %path.display(), "Artifact loaded");
        Ok(artifact)
    }

    pub fn bytecode(&self) -> Result<Vec<u8>> {
        let code = self.bytecode.trim_start_matches("0x");
        if code.is_empty() {
            anyhow::bail!(
                "Artifact {} has no bytecode (abstract contract or interface?)",
                self.contract_name
            );
        }
        hex::decode(code).with_context(|| format!("Invalid bytecode in {}", self.contract_name))
    }
}

/// Depth-first search for `<name>.json`. Debug files (`.dbg.json`) never match.
fn find_artifact(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    let file_name = format!("{name}.json");
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().and_then(|f| f.to_str()) == Some(file_name.as_str()) {
            return Ok(Some(path));
        }
    }

    subdirs.sort();
    for subdir in subdirs {
        if let Some(found) = find_artifact(&subdir, name)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}
