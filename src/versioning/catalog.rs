//! On-disk version catalog.
//!
//! Read-side companion to the allocator: enumerates existing versions of a
//! persona from the output tree and reads back the delivery-pack metadata
//! each build left behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::versioning::store::{DirVersionStore, VERSION_DIR_PATTERN};

const DELIVERY_PACK_FILE: &str = "delivery_pack.json";

/// Metadata for one stored persona version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: u32,
    /// Directory name, e.g. `v3`.
    pub version_str: String,
    pub path: PathBuf,
    /// Artifact file names, sorted.
    pub files: Vec<String>,
    pub confidence_score: Option<f64>,
    pub confidence_grade: Option<String>,
    pub spec_valid: Option<bool>,
    pub persona_name: Option<String>,
}

/// All versions of one persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaVersions {
    pub slug: String,
    pub versions: Vec<VersionInfo>,
    pub total_versions: u32,
    pub latest_version: u32,
    pub next_version: u32,
}

/// Summary row for the persona listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSummary {
    pub slug: String,
    pub total_versions: u32,
    pub latest_version: u32,
}

/// Enumerate all versions of a persona under `output_root`.
pub fn persona_versions(output_root: &Path, slug: &str) -> Result<PersonaVersions> {
    let persona_dir = output_root.join(slug);

    let mut versions = Vec::new();
    if persona_dir.is_dir() {
        let entries = fs::read_dir(&persona_dir)
            .map_err(|e| Error::io_read(persona_dir.clone(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io_read(persona_dir.clone(), e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(captures) = name.to_str().and_then(|n| VERSION_DIR_PATTERN.captures(n))
            else {
                continue;
            };
            if let Ok(version) = captures[1].parse::<u32>() {
                versions.push(read_version_info(&path, version));
            }
        }
    }

    versions.sort_by_key(|v| v.version);
    let latest_version = versions.last().map(|v| v.version).unwrap_or(0);

    Ok(PersonaVersions {
        slug: slug.to_string(),
        total_versions: versions.len() as u32,
        latest_version,
        next_version: latest_version + 1,
        versions,
    })
}

/// Next version number for a persona, derived from the catalog.
///
/// Advisory only: actual allocation must go through the
/// [`VersionAllocator`](crate::versioning::VersionAllocator) so concurrent
/// builders cannot claim the same number.
pub fn next_version(output_root: &Path, slug: &str) -> Result<u32> {
    Ok(DirVersionStore::scan_max(&output_root.join(slug))? + 1)
}

/// List all personas that have at least one version on disk.
pub fn list_personas(output_root: &Path) -> Result<Vec<PersonaSummary>> {
    let mut personas = Vec::new();
    if !output_root.is_dir() {
        return Ok(personas);
    }

    let mut slugs = Vec::new();
    let entries =
        fs::read_dir(output_root).map_err(|e| Error::io_read(output_root.to_path_buf(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io_read(output_root.to_path_buf(), e))?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            // Underscore-prefixed directories are scratch space
            if !name.starts_with('_') {
                slugs.push(name.to_string());
            }
        }
    }
    slugs.sort_unstable();

    for slug in slugs {
        let info = persona_versions(output_root, &slug)?;
        if info.total_versions > 0 {
            personas.push(PersonaSummary {
                slug: info.slug,
                total_versions: info.total_versions,
                latest_version: info.latest_version,
            });
        }
    }

    Ok(personas)
}

/// Read version metadata from a version directory.
///
/// Missing or malformed delivery packs are tolerated: the version is still
/// listed, just without scores.
fn read_version_info(version_path: &Path, version: u32) -> VersionInfo {
    let pack: Option<Value> = fs::read_to_string(version_path.join(DELIVERY_PACK_FILE))
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok());

    let mut files: Vec<String> = fs::read_dir(version_path)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter_map(|e| e.file_name().to_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    files.sort_unstable();

    let field = |key: &str| pack.as_ref().and_then(|p| p.get(key).cloned());

    VersionInfo {
        version,
        version_str: format!("v{}", version),
        path: version_path.to_path_buf(),
        files,
        confidence_score: field("confidence_score").and_then(|v| v.as_f64()),
        confidence_grade: field("confidence_grade")
            .and_then(|v| v.as_str().map(String::from)),
        spec_valid: field("spec_valid").and_then(|v| v.as_bool()),
        persona_name: field("persona_name").and_then(|v| v.as_str().map(String::from)),
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pack(dir: &Path, name: &str, score: f64) {
        fs::create_dir_all(dir).unwrap();
        let pack = serde_json::json!({
            "persona_name": name,
            "confidence_score": score,
            "confidence_grade": "A",
            "spec_valid": true,
        });
        fs::write(
            dir.join(DELIVERY_PACK_FILE),
            serde_json::to_string_pretty(&pack).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_no_versions_next_is_one() {
        let tmp = TempDir::new().unwrap();
        let info = persona_versions(tmp.path(), "nonexistent").unwrap();
        assert_eq!(info.total_versions, 0);
        assert_eq!(info.latest_version, 0);
        assert_eq!(info.next_version, 1);
        assert_eq!(next_version(tmp.path(), "nonexistent").unwrap(), 1);
    }

    #[test]
    fn test_versions_sorted_with_metadata() {
        let tmp = TempDir::new().unwrap();
        write_pack(&tmp.path().join("rebecka").join("v2"), "Rebecka", 0.91);
        write_pack(&tmp.path().join("rebecka").join("v1"), "Rebecka", 0.88);

        let info = persona_versions(tmp.path(), "rebecka").unwrap();
        assert_eq!(info.total_versions, 2);
        assert_eq!(info.latest_version, 2);
        assert_eq!(info.next_version, 3);
        assert_eq!(info.versions[0].version, 1);
        assert_eq!(info.versions[1].version, 2);
        assert_eq!(info.versions[0].persona_name.as_deref(), Some("Rebecka"));
        assert_eq!(info.versions[0].confidence_score, Some(0.88));
        assert!(info.versions[0]
            .files
            .contains(&DELIVERY_PACK_FILE.to_string()));
    }

    #[test]
    fn test_malformed_pack_is_tolerated() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("rebecka").join("v1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DELIVERY_PACK_FILE), "{not json").unwrap();

        let info = persona_versions(tmp.path(), "rebecka").unwrap();
        assert_eq!(info.total_versions, 1);
        assert!(info.versions[0].confidence_score.is_none());
    }

    #[test]
    fn test_list_personas() {
        let tmp = TempDir::new().unwrap();
        write_pack(&tmp.path().join("rebecka").join("v1"), "Rebecka", 0.9);
        write_pack(&tmp.path().join("daniel").join("v1"), "Daniel", 0.8);
        // Scratch and empty directories are skipped
        fs::create_dir_all(tmp.path().join("_scratch").join("v1")).unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let personas = list_personas(tmp.path()).unwrap();
        let slugs: Vec<&str> = personas.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["daniel", "rebecka"]);
    }

    #[test]
    fn test_list_personas_missing_root() {
        let tmp = TempDir::new().unwrap();
        let personas = list_personas(&tmp.path().join("does-not-exist")).unwrap();
        assert!(personas.is_empty());
    }
}
