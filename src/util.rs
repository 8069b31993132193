use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// RFC 3339 timestamp in UTC, whole seconds, for render manifests.
pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("cannot create output directory {}", path.display()))
}

/// Hex SHA-256 of the file, recorded so a manifest pins the exact export.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("cannot open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("cannot hash {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let mut text = serde_json::to_string_pretty(value)
        .with_context(|| format!("cannot serialize {}", path.display()))?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))
}

/// `<input dir>/<profile>.svg`, so charts land next to the export they plot.
pub fn default_chart_path(input: &Path, profile_name: &str) -> PathBuf {
    let file_name = format!("{profile_name}.svg");
    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_matches_known_digest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("blob.txt");
        fs::write(&path, "abc").expect("write fixture");

        assert_eq!(
            sha256_file(&path).expect("hash"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn write_json_pretty_creates_parent_and_trailing_newline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("manifest.json");

        write_json_pretty(&path, &serde_json::json!({"series": 3})).expect("write");
        let raw = fs::read_to_string(&path).expect("read back");
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\"series\": 3"));
    }

    #[test]
    fn default_chart_path_sits_next_to_input() {
        assert_eq!(
            default_chart_path(Path::new("data/all_submissions.csv"), "radar"),
            PathBuf::from("data/radar.svg")
        );
        assert_eq!(
            default_chart_path(Path::new("all_submissions.csv"), "bar"),
            PathBuf::from("bar.svg")
        );
    }
}
