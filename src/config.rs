use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::iter::FromIterator;
use std::path::{Path, PathBuf};

use crate::clock::Zone;
use crate::error::*;
use crate::month::{is_valid_label_format, DEFAULT_LABEL_FORMAT};
use crate::render::InstanceId;

const CONFIG_PATH_ENV_VAR: &str = "CALMONTH_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env: Option<PathBuf> = if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        Some(PathBuf::from(path))
    } else {
        None
    };

    let home = if let Some(dir) = dirs::home_dir() {
        dir
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "Unable to find home directory",
        ));
    };

    let home_config = PathBuf::from_iter([&home, &PathBuf::from(".calmonth.toml")].iter());

    let config_xdg = if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from_iter([dir, "calmonth".to_string(), "config.toml".to_string()].iter())
    } else {
        PathBuf::from_iter(
            [
                home.as_path(),
                Path::new(".config"),
                Path::new("calmonth"),
                Path::new("config.toml"),
            ]
            .iter(),
        )
    };

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("calmonth")
        .join("state.toml")
}

fn default_label_format() -> String {
    DEFAULT_LABEL_FORMAT.to_owned()
}

fn default_instances() -> Vec<InstanceId> {
    vec![InstanceId(1)]
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File holding the persisted widget state.
    pub store: PathBuf,
    pub label_format: String,
    pub timezone: Zone,
    pub instances: Vec<InstanceId>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            store: default_store_path(),
            label_format: default_label_format(),
            timezone: Zone::default(),
            instances: default_instances(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Config> {
        Config::parse(content, "config")
    }

    pub fn from_path(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        Config::parse(&content, &format!("'{}'", path.display()))
    }

    fn parse(content: &str, origin: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).map_err(|err: toml::de::Error| {
            Error::new(ErrorKind::ConfigParse, &format!("{}: {}", origin, err))
        })?;
        config.validate()
    }

    fn validate(self) -> Result<Config> {
        if !is_valid_label_format(&self.label_format) {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                &format!("'{}' is not a valid label format", self.label_format),
            ));
        }
        Ok(self)
    }
}

/// Loads `path` if given, otherwise the first existing default location,
/// otherwise the built-in defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_path(path);
    }

    let locations = find_configfile_locations().unwrap_or_else(|err| {
        log::warn!("{}", err);
        Vec::new()
    });

    match locations.iter().find(|location| location.is_file()) {
        Some(location) => {
            log::info!("Using config '{}'", location.display());
            Config::from_path(location)
        }
        None => {
            log::info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
