//! Wrapper around globset's Glob type that has better serialization
//! characteristics by coupling Glob and GlobMatcher into a single type.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use globset::{Glob as InnerGlob, GlobBuilder, GlobMatcher};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

pub use globset::Error;

/// A pattern matched against paths relative to the folder being packed.
///
/// `*` never crosses a `/`, so `*.png` only matches images directly inside
/// the folder while `**/*.png` matches them at any depth.
#[derive(Debug, Clone)]
pub struct Glob {
    inner: InnerGlob,
    matcher: GlobMatcher,
}

impl Glob {
    pub fn new(glob: &str) -> Result<Self, Error> {
        let inner = GlobBuilder::new(glob).literal_separator(true).build()?;
        let matcher = inner.compile_matcher();

        Ok(Glob { inner, matcher })
    }

    pub fn is_match<P: AsRef<Path>>(&self, path: P) -> bool {
        self.matcher.is_match(path)
    }

    /// The leading part of the pattern that contains no pattern syntax. Only
    /// this folder needs to be searched for matches.
    pub fn get_prefix(&self) -> PathBuf {
        get_non_pattern_prefix(Path::new(self.inner.glob()))
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Glob {}

impl Serialize for Glob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.inner.glob())
    }
}

impl<'de> Deserialize<'de> for Glob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let glob = String::deserialize(deserializer)?;

        Glob::new(&glob).map_err(D::Error::custom)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}

// Characters that might indicate the use of glob pattern syntax. This has
// false positives for escapes like `[*]`, which only makes the search start
// higher up than it needs to.
const GLOB_PATTERN_CHARACTERS: &str = "*?{}[]";

fn get_non_pattern_prefix(glob_path: &Path) -> PathBuf {
    let mut prefix = PathBuf::new();

    let mut components = glob_path.iter().peekable();
    while let Some(component) = components.next() {
        // The last component names files, not a folder to search in.
        if components.peek().is_none() {
            break;
        }

        let component_str = component.to_string_lossy();

        if GLOB_PATTERN_CHARACTERS
            .chars()
            .any(|special_char| component_str.contains(special_char))
        {
            break;
        }

        prefix.push(component);
    }

    prefix
}
