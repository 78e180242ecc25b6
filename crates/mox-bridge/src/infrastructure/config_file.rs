//! Loading the bridge config from disk.

use std::path::Path;

use tracing::debug;

use crate::domain::{BridgeConfig, ConfigError};

/// Reads, parses and validates the config file at `path`.
///
/// Unlike an application settings file there is no usable default: the
/// client IP address must come from somewhere, so a missing file is an
/// error.
///
/// # Errors
///
/// [`ConfigError::Io`] if the file cannot be read, otherwise whatever
/// [`BridgeConfig::from_toml_str`] reports.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = BridgeConfig::from_toml_str(&content)?;
    debug!(
        "loaded {} ({} accessories)",
        path.display(),
        config.accessories().count()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mox_bridge_{}_{name}.toml", std::process::id()))
    }

    #[test]
    fn test_load_config_reads_file() {
        // Arrange
        let path = temp_path("valid");
        std::fs::write(
            &path,
            "client_ip_address = \"127.0.0.1\"\nserver_port_number = 7777\n",
        )
        .unwrap();

        // Act
        let cfg = load_config(&path).expect("loads");

        // Assert
        assert_eq!(cfg.server_port_number, 7777);

        // Cleanup
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error_with_path() {
        let path = temp_path("does_not_exist");

        let err = load_config(&path).unwrap_err();

        match err {
            ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = temp_path("malformed");
        std::fs::write(&path, "client_ip_address = [").unwrap();

        let result = load_config(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_file(&path).ok();
    }
}
