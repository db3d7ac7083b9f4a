use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse a running-configuration path that points at the candidate file.
pub fn ensure_running_not_candidate(running: &Path, candidate: &Path) -> Result<()> {
    let running_norm = normalize_for_compare(running)
        .with_context(|| format!("failed to normalize running path {}", running.display()))?;
    let candidate_norm = normalize_for_compare(candidate)
        .with_context(|| format!("failed to normalize device path {}", candidate.display()))?;

    if running_norm == candidate_norm {
        bail!(
            "refusing to commit over the candidate configuration: --running {} matches --device {}",
            running.display(),
            candidate.display()
        );
    }
    Ok(())
}

fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    // Not on disk yet; `..` segments are left unresolved.
    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().context("current_dir")?
    };
    Ok(base.join(path))
}
