use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

/// Load `.env` from the working directory, then from its parent.
///
/// Variables that are already set are left alone, so the first file to
/// define a key wins. Returns the files that were found.
pub fn load_dotenv() -> Result<Vec<PathBuf>> {
    let cwd = std::env::current_dir()?;
    load_env_files(&env_file_candidates(&cwd))
}

pub fn env_file_candidates(dir: &Path) -> Vec<PathBuf> {
    vec![dir.join(".env"), dir.join("..").join(".env")]
}

pub fn load_env_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut loaded = Vec::new();
    for path in paths {
        match dotenvy::from_path(path) {
            Ok(()) => loaded.push(path.clone()),
            Err(err) if err.not_found() => {}
            Err(err) => {
                return Err(anyhow!("Failed to load environment from {}: {err}", path.display()))
            }
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearer_file_wins_and_set_vars_are_kept() {
        let root = tempfile::tempdir().unwrap();
        let child = root.path().join("workspace");
        std::fs::create_dir(&child).unwrap();
        std::fs::write(
            child.join(".env"),
            "CODEPAD_DOTENV_ORDER=child\nCODEPAD_DOTENV_THEME=dark # night\n",
        )
        .unwrap();
        std::fs::write(
            root.path().join(".env"),
            "CODEPAD_DOTENV_ORDER=parent\nCODEPAD_DOTENV_PARENT_ONLY=yes\nCODEPAD_DOTENV_PRESET=file\n",
        )
        .unwrap();
        std::env::set_var("CODEPAD_DOTENV_PRESET", "shell");

        let loaded = load_env_files(&env_file_candidates(&child)).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(std::env::var("CODEPAD_DOTENV_ORDER").unwrap(), "child");
        assert_eq!(std::env::var("CODEPAD_DOTENV_PARENT_ONLY").unwrap(), "yes");
        assert_eq!(std::env::var("CODEPAD_DOTENV_PRESET").unwrap(), "shell");
        assert_eq!(std::env::var("CODEPAD_DOTENV_THEME").unwrap(), "dark");
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_files(&env_file_candidates(dir.path())).unwrap().is_empty());
    }
}
