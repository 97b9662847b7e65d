//! Advisory source-tree scans. Failures here degrade to empty results;
//! detection never fails because a directory is unreadable.

use std::path::Path;

/// Service modules already present under `src/services/`, by module name.
pub fn collect_services(root: &Path) -> Vec<String> {
    let dir = root.join("src").join("services");
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "no services directory");
            return Vec::new();
        }
    };

    let mut services: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|ty| ty.is_file()))
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "rs") {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            } else {
                None
            }
        })
        .filter(|stem| stem != "mod")
        .collect();
    services.sort();
    services
}

/// Whether the project carries an API surface module.
pub fn has_api(root: &Path) -> bool {
    root.join("src").join("api.rs").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_services_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let services = dir.path().join("src/services");
        std::fs::create_dir_all(&services).unwrap();
        for name in ["orders.rs", "accounts.rs", "mod.rs", "notes.txt"] {
            std::fs::write(services.join(name), "").unwrap();
        }
        std::fs::create_dir(services.join("nested.rs")).unwrap();

        let found = collect_services(dir.path());
        assert_eq!(found, vec!["accounts", "orders"]);
    }

    #[test]
    fn test_missing_services_directory_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_services(dir.path()).is_empty());
    }

    #[test]
    fn test_has_api_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_api(dir.path()));

        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/api.rs"), "").unwrap();
        assert!(has_api(dir.path()));
    }
}
