//! Config file discovery.

use std::path::{Path, PathBuf};

/// First `.glide/config.toml` from `start_dir` upwards, then the user config
/// directory.
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    let found = walk_ancestors(start_dir).or_else(system_config);
    match &found {
        Some(path) => tracing::info!("using config {}", path.display()),
        None => tracing::debug!("no config file found, using defaults"),
    }
    found
}

fn walk_ancestors(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(".glide").join("config.toml"))
        .find(|candidate| candidate.is_file())
}

fn system_config() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("glide").join("config.toml");
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_config_in_ancestor() {
        let tmp = tempdir().unwrap();
        let glide_dir = tmp.path().join(".glide");
        fs::create_dir(&glide_dir).unwrap();
        fs::write(glide_dir.join("config.toml"), "smooth_scroll = false\n").unwrap();

        let child = tmp.path().join("a").join("b");
        fs::create_dir_all(&child).unwrap();

        assert_eq!(
            discover_config(&child).as_deref(),
            Some(glide_dir.join("config.toml").as_path())
        );
    }

    #[test]
    fn empty_glide_dir_is_skipped() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join(".glide")).unwrap();

        // Falls through to the user config directory, which may or may not
        // exist on this machine.
        if let Some(path) = discover_config(tmp.path()) {
            assert!(!path.starts_with(tmp.path()));
            assert!(path.is_file());
        }
    }
}
