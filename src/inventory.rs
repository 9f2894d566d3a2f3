// SPDX-License-Identifier: PMPL-1.0-or-later

//! Installed mod inventory: jar archives in the mods directory keyed by
//! their short identifiers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Map from short mod identifier to archive path.
///
/// The identifier is the jar filename's segment before the first hyphen,
/// lowercased, with the `.jar` extension stripped if it remains. Entries
/// are visited in lexicographic filename order so duplicate identifiers
/// resolve deterministically: the lexicographically last filename wins.
#[derive(Debug, Clone, Default)]
pub struct ModInventory {
    records: BTreeMap<String, PathBuf>,
}

impl ModInventory {
    /// Enumerate jar archives directly inside `dir`. Subdirectories are
    /// not descended into. A missing directory yields an empty
    /// inventory, not an error.
    pub fn scan(dir: &Path) -> Self {
        let mut names: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !file_name.to_lowercase().ends_with(".jar") {
                continue;
            }
            names.push((file_name.to_string(), entry.path().to_path_buf()));
        }

        names.sort_by(|a, b| a.0.cmp(&b.0));
        let mut records = BTreeMap::new();
        for (file_name, path) in names {
            records.insert(derive_identifier(&file_name), path);
        }
        Self { records }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(&id.to_lowercase())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// `(identifier, archive path)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.records
            .iter()
            .map(|(id, path)| (id.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `Sodium-Fabric-0.5.8.jar` becomes `sodium`.
fn derive_identifier(file_name: &str) -> String {
    let lowered = file_name.to_lowercase();
    let head = lowered.split('-').next().unwrap_or(&lowered);
    head.strip_suffix(".jar").unwrap_or(head).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_takes_segment_before_first_hyphen() {
        assert_eq!(derive_identifier("Sodium-Fabric-0.5.8.jar"), "sodium");
        assert_eq!(derive_identifier("jei-1.20.1-forge.jar"), "jei");
    }

    #[test]
    fn identifier_strips_extension_when_no_hyphen() {
        assert_eq!(derive_identifier("OptiFine.jar"), "optifine");
    }
}
