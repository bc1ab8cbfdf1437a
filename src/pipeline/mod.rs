//! Unit discovery, loading and composition.
//!
//! The pipeline turns unit files into [`ResultSet`]s, one per unit:
//!
//! 1. [`discover_unit_files`] walks the given paths for `*.json` unit files
//! 2. [`load_units`] reads and parses them concurrently
//! 3. [`compose_unit`] feeds each unit into its own [`ResultSet`]
//!
//! # Example
//!
//! ```
//! use compose_result::model::UnitInput;
//! use compose_result::pipeline::compose_unit;
//! use compose_result::Config;
//!
//! let unit: UnitInput = serde_json::from_str(r#"{
//!     "bundle_kind": "package",
//!     "bundle_id": "foo",
//!     "components": [{ "component": { "id": "org.example.Foo" }, "data": ["v1"] }]
//! }"#)?;
//!
//! let result = compose_unit(unit, &Config::default());
//! assert_eq!(result.components_count(), 1);
//! # Ok::<(), serde_json::Error>(())
//! ```

use crate::config::Config;
use crate::model::{ComponentInput, Hint, HintSeverity, UnitBundle, UnitInput};
use crate::result::ResultSet;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Component ID used for hints that concern the unit as a whole.
pub const GENERAL_HINT_CID: &str = "general";

/// Collects unit files from `paths`.
///
/// Files are taken as given; directories are walked recursively for files
/// with a `.json` extension. The returned list is sorted.
pub fn discover_unit_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && entry_path.extension().map(|e| e == "json").unwrap_or(false)
            {
                files.push(entry_path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Reads and parses a single unit file.
pub async fn load_unit(path: &Path) -> Result<UnitInput> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read unit file {}", path.display()))?;
    let unit = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse unit file {}", path.display()))?;
    Ok(unit)
}

/// Loads all unit files concurrently, keeping the input order.
pub async fn load_units(paths: &[PathBuf]) -> Vec<(PathBuf, Result<UnitInput>)> {
    let futures = paths.iter().map(|path| async move {
        let unit = load_unit(path).await;
        (path.clone(), unit)
    });

    join_all(futures).await
}

/// Composes one unit into a fresh [`ResultSet`].
///
/// Components listed in the ignore configuration are not added; an `Info`
/// hint is recorded for them instead. Components without an ID produce an
/// `Error` hint on [`GENERAL_HINT_CID`].
pub fn compose_unit(unit: UnitInput, config: &Config) -> ResultSet {
    let mut result = ResultSet::with_checksum(config.checksum);

    if let Some(bundle_id) = unit.bundle_id.as_deref() {
        if config.ignore.should_ignore_unit(bundle_id) {
            debug!(bundle_id, "Skipping ignored unit");
            return result;
        }
    }

    result.set_bundle_kind(unit.bundle_kind.map_or(UnitBundle::Unknown, UnitBundle::Known));
    result.set_bundle_id(unit.bundle_id.as_deref());

    for input in unit.components {
        add_component_input(&mut result, input, config);
    }

    for hint in unit.hints {
        result.add_hint(&hint.component_id, hint.hint);
    }

    debug!(
        bundle_id = result.bundle_id().unwrap_or_default(),
        components = result.components_count(),
        hints = result.hints_count(),
        "Composed unit"
    );

    result
}

fn add_component_input(result: &mut ResultSet, input: ComponentInput, config: &Config) {
    let cid = input.component.id().to_string();

    if config.ignore.should_ignore_component(&cid) {
        debug!(cid, "Ignoring component");
        result.add_hint(&cid, Hint::new("component-ignored", HintSeverity::Info));
        return;
    }

    let mut fragments = input.data.iter();
    let seed = fragments.next().map(String::as_str).unwrap_or_default();

    let cpt = input.component.into_ref();
    if let Err(e) = result.add_component(cpt.clone(), seed) {
        warn!(error = %e, "Dropping component");
        result.add_hint(
            GENERAL_HINT_CID,
            Hint::new("component-id-missing", HintSeverity::Error).with_var("msg", e.to_string()),
        );
        return;
    }

    for fragment in fragments {
        let updated = result.update_component_gcid(&cpt, fragment);
        assert!(updated, "component '{}' missing right after insertion", cid);
    }
}

/// File name for the hints export of the unit read from `path`.
///
/// Every path component takes part in the name, so units with the same file
/// name in different directories do not share an export file.
pub fn hints_file_name(path: &Path) -> String {
    let stem = path.with_extension("");
    let parts: Vec<String> = stem
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    let safe_name: String = parts
        .join("_")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if safe_name.is_empty() {
        "unit.hints.json".to_string()
    } else {
        format!("{}.hints.json", safe_name)
    }
}
