use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::glob::Glob;

static CONFIG_FILENAME: &str = "spriter.toml";

/// Configuration for packing a folder, contained in an optional spriter.toml
/// file inside of that folder.
///
/// Options given on the command line take precedence over this file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Transparent pixels to keep between images and around the edge of the
    /// atlas.
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// The largest atlas that may be produced. Unlimited if not given.
    #[serde(default)]
    pub max_size: Option<(u32, u32)>,

    /// Which files in the folder should be packed.
    #[serde(default = "default_glob")]
    pub glob: Glob,

    /// Where to put the atlas, relative to the folder containing this file.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Values copied into the `meta` section of the generated JSON file.
    #[serde(default)]
    pub meta: MetaConfig,

    /// The path that this config came from, if it was read from disk.
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            max_size: None,
            glob: default_glob(),
            output: None,
            meta: MetaConfig::default(),
            file_path: None,
        }
    }
}

impl Config {
    /// Reads the config file from the given folder, falling back to the
    /// default config if the folder doesn't have one.
    pub fn read_from_folder_or_default<P: AsRef<Path>>(folder_path: P) -> Result<Self, ConfigError> {
        match Self::read_from_file(folder_path.as_ref().join(CONFIG_FILENAME)) {
            Ok(config) => Ok(config),
            Err(err) if err.is_not_found() => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        let mut config: Self = toml::from_slice(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_owned(),
            source,
        })?;
        config.file_path = Some(path.to_owned());

        Ok(config)
    }

    /// Resolves the configured output folder against the folder this config
    /// was read from.
    pub fn output_folder(&self) -> Option<PathBuf> {
        let output = self.output.as_ref()?;

        match self.file_path.as_ref().and_then(|path| path.parent()) {
            Some(folder) => Some(folder.join(output)),
            None => Some(output.clone()),
        }
    }
}

fn default_padding() -> u32 {
    1
}

fn default_glob() -> Glob {
    Glob::new("*.png").expect("default glob is valid")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MetaConfig {
    #[serde(default = "default_app")]
    pub app: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_scale")]
    pub scale: String,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            app: default_app(),
            version: default_version(),
            format: default_format(),
            scale: default_scale(),
        }
    }
}

fn default_app() -> String {
    String::from("spriter")
}

fn default_version() -> String {
    String::from("1.0")
}

fn default_format() -> String {
    String::from("RGBA8888")
}

fn default_scale() -> String {
    String::from("1")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{source} in {}", path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{source} in {}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ConfigError {
    /// Tells whether this ConfigError originated because of a path not
    /// existing.
    pub fn is_not_found(&self) -> bool {
        match self {
            ConfigError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.padding, 1);
        assert!(config.glob.is_match("coin.png"));
    }

    #[test]
    fn full_file() {
        let config: Config = toml::from_str(
            r#"
            padding = 2
            max-size = [2048, 1024]
            glob = "**/*.png"
            output = "../build"

            [meta]
            app = "my-game"
            scale = "0.5"
            "#,
        )
        .unwrap();

        assert_eq!(config.padding, 2);
        assert_eq!(config.max_size, Some((2048, 1024)));
        assert!(config.glob.is_match("ui/button.png"));
        assert_eq!(config.meta.app, "my-game");
        assert_eq!(config.meta.version, "1.0");
        assert_eq!(config.meta.scale, "0.5");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<Config>("rotate = true").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::read_from_folder_or_default(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_folder(), None);
    }

    #[test]
    fn output_is_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "output = \"out\"").unwrap();

        let config = Config::read_from_folder_or_default(dir.path()).unwrap();
        assert_eq!(config.output_folder(), Some(dir.path().join("out")));
    }

    #[test]
    fn bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "padding = \"lots\"").unwrap();

        let err = Config::read_from_folder_or_default(dir.path()).unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains(CONFIG_FILENAME));
    }
}
