use std::{
    fmt,
    path::{self, Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

/// The name of a single image inside of an atlas.
///
/// Names are the image's path relative to the folder that was packed, always
/// using `/` as the separator so that atlases stay portable between
/// platforms. They're used as keys in the atlas's JSON file and as the file
/// names that images are written back out to when unpacking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteName(Arc<str>);

impl SpriteName {
    /// Creates a name for `sprite_path`, which must be located inside of
    /// `root_path`. Returns `None` otherwise.
    pub fn from_paths(root_path: &Path, sprite_path: &Path) -> Option<Self> {
        let relative = sprite_path.strip_prefix(root_path).ok()?;

        let displayed = format!("{}", relative.display());

        // In order to make relative paths behave cross-platform, fix the path
        // separator to always be / on platforms where it isn't the main separator.
        let displayed = if path::MAIN_SEPARATOR == '/' {
            displayed
        } else {
            displayed.replace(path::MAIN_SEPARATOR, "/")
        };

        Some(SpriteName(displayed.into()))
    }

    /// Resolves where this sprite should be written underneath `folder`.
    ///
    /// Names come from files that anyone could have edited, so components
    /// that would escape `folder`, like `..` or absolute roots, are dropped.
    pub fn output_path(&self, folder: &Path) -> PathBuf {
        let mut output = folder.to_path_buf();

        for component in self.0.split('/') {
            match component {
                "" | "." | ".." => {}
                other if other.contains(':') || other.contains('\\') => {}
                other => output.push(other),
            }
        }

        output
    }
}

impl From<&str> for SpriteName {
    fn from(value: &str) -> Self {
        SpriteName(value.into())
    }
}

impl AsRef<str> for SpriteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpriteName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
