//! User configuration loaded from `config.toml`.

use cellgrid_engine::engine::DEFAULT_MAX_DEPTH;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    precision: Option<usize>,
    max_depth: Option<usize>,
}

/// Rendering and evaluation settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Fixed decimals for non-integer numbers; `None` prints the shortest exact text.
    pub precision: Option<usize>,
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            precision: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    /// Command line values win over the file.
    pub fn with_overrides(self, precision: Option<usize>, max_depth: Option<usize>) -> Config {
        Config {
            precision: precision.or(self.precision),
            max_depth: max_depth.unwrap_or(self.max_depth),
        }
    }
}

/// Load the config from `config_file`, or from the user config dir when none
/// is given. Problems are returned as warnings and the defaults are used.
pub fn load_config(config_file: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let mut config = Config::default();

    match config_file.map(Path::to_path_buf).or_else(user_config_path) {
        Some(path) if path.exists() => match read_config_file(&path) {
            Ok(file) => config = config.with_overrides(file.precision, file.max_depth),
            Err(warning) => warnings.push(warning),
        },
        Some(path) if config_file.is_some() => {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        _ => {}
    }
    (config, warnings)
}

fn read_config_file(path: &Path) -> Result<ConfigFile, String> {
    let size = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?
        .len();
    if size > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            size,
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str(&content).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
