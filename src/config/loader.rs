use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a [`Config`] from a JSON, YAML or TOML file, chosen by extension.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Cannot read config file {}: {e}", path.display()))
    })?;
    debug!("Loading config from {}", path.display());

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let config = match extension.as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| invalid(path, e))?,
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| invalid(path, e))?,
        "toml" => toml::from_str(&content).map_err(|e| invalid(path, e))?,
        other => {
            return Err(Error::config(format!(
                "Unsupported config file extension '{other}' for {}",
                path.display()
            )))
        }
    };
    Ok(config)
}

fn invalid(path: &Path, error: impl std::fmt::Display) -> Error {
    Error::config(format!("Invalid config file {}: {error}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_json_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"source": ["tokens/*.json"], "platforms": {"web": {"transformGroup": "web"}}}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.source, vec!["tokens/*.json"]);
        assert!(config.platforms.contains_key("web"));
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            "source:\n  - tokens/*.json\nplatforms:\n  android:\n    transformGroup: android\n    files:\n      - destination: colors.xml\n        format: android/resources\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        let android = &config.platforms["android"];
        assert_eq!(android.files[0].format.as_deref(), Some("android/resources"));
    }

    #[test]
    fn test_load_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "source = [\"tokens/*.json\"]\n\n[platforms.js]\ntransformGroup = \"js\"\nbuildPath = \"build/\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.platforms["js"].build_path.as_deref(), Some("build/"));
    }

    #[test]
    fn test_unknown_extension_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "").unwrap();
        assert!(load_config(&path).unwrap_err().is_config());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{\"platforms\": [").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(&dir.path().join("nope.json"))
            .unwrap_err()
            .is_config());
    }
}
