use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "contv-dl.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub concurrent_downloads: usize,
    pub user_agent: String,
    pub timeout: u64,
    pub retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            concurrent_downloads: 1,
            user_agent: format!("contv-dl/{}", env!("CARGO_PKG_VERSION")),
            timeout: 30,
            retries: 3,
        }
    }
}

impl Config {
    /// Read `contv-dl.toml` from the working directory when present,
    /// defaults otherwise.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.concurrent_downloads, 1);
        assert_eq!(config.retries, 3);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("contv-dl.toml");
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "retries = 5")?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.retries, 5);
        assert_eq!(config.concurrent_downloads, 1);
        Ok(())
    }
}
