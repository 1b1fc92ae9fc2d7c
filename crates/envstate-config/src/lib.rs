pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// Environment variable naming the environment file directly
pub const ENV_FILE_VAR: &str = "ENVSTATE_ENV_FILE";

/// Port the HTTP server listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 8080;

/// File names searched in the current directory, highest priority first
const CANDIDATES: [&str; 3] = ["envstate.local.yaml", "envstate.yaml", "environment.yaml"];

/// Directory searched after the current directory's own files
const PROJECT_DIR: &str = ".envstate";

const GLOBAL_FILE: &str = "environment.yaml";

/// Locate the environment file
///
/// Search order:
/// 1. `explicit` (the `--env-file` flag); must exist
/// 2. `ENVSTATE_ENV_FILE`; must exist
/// 3. current directory: envstate.local.yaml, envstate.yaml, environment.yaml
/// 4. ./.envstate/environment.yaml
/// 5. ~/.config/envstate/environment.yaml
pub fn find_environment_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(ENV_FILE_VAR)
        && !path.is_empty()
    {
        return existing(PathBuf::from(path));
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_in_dir(&current_dir) {
        return Ok(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("envstate").join(GLOBAL_FILE);
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::EnvironmentFileNotFound)
}

/// Search one directory (and its `.envstate/`) for an environment file
pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .chain(std::iter::once(dir.join(PROJECT_DIR).join(GLOBAL_FILE)))
        .find(|path| path.is_file())
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::ExplicitFileMissing(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_find_in_dir_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();

        assert!(find_in_dir(dir).is_none());

        fs::create_dir(dir.join(".envstate")).unwrap();
        fs::write(dir.join(".envstate/environment.yaml"), "environment: []").unwrap();
        assert!(find_in_dir(dir).unwrap().ends_with(".envstate/environment.yaml"));

        fs::write(dir.join("environment.yaml"), "environment: []").unwrap();
        assert!(find_in_dir(dir).unwrap().ends_with("environment.yaml"));
        assert!(!find_in_dir(dir).unwrap().ends_with(".envstate/environment.yaml"));

        fs::write(dir.join("envstate.yaml"), "environment: []").unwrap();
        assert!(find_in_dir(dir).unwrap().ends_with("envstate.yaml"));

        fs::write(dir.join("envstate.local.yaml"), "environment: []").unwrap();
        assert!(find_in_dir(dir).unwrap().ends_with("envstate.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let explicit = temp_dir.path().join("custom.yaml");
        fs::write(&explicit, "environment: []").unwrap();

        temp_env::with_var(ENV_FILE_VAR, Some("/nonexistent/other.yaml"), || {
            assert_eq!(find_environment_file(Some(&explicit)).unwrap(), explicit);
        });
    }

    #[test]
    #[serial]
    fn test_explicit_path_must_exist() {
        let result = find_environment_file(Some(Path::new("/nonexistent/env.yaml")));
        assert!(matches!(result, Err(ConfigError::ExplicitFileMissing(_))));
    }

    #[test]
    #[serial]
    fn test_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("from-env.yaml");
        fs::write(&config_path, "environment: []").unwrap();

        temp_env::with_var(ENV_FILE_VAR, Some(config_path.to_str().unwrap()), || {
            assert_eq!(find_environment_file(None).unwrap(), config_path);
        });
    }

    #[test]
    #[serial]
    fn test_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::write(temp_dir.path().join("envstate.yaml"), "environment: []").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_var_unset(ENV_FILE_VAR, || find_environment_file(None));
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("envstate.yaml"));
    }

    #[test]
    #[serial]
    fn test_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = temp_env::with_vars(
            [
                (ENV_FILE_VAR, None),
                ("HOME", Some(temp_dir.path().to_str().unwrap())),
                ("XDG_CONFIG_HOME", Some(temp_dir.path().to_str().unwrap())),
            ],
            || find_environment_file(None),
        );
        std::env::set_current_dir(original_dir).unwrap();

        assert!(matches!(result, Err(ConfigError::EnvironmentFileNotFound)));
    }
}
