use std::{
    collections::BTreeMap,
    fs,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use packtree::{PackOutput, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{data::MetaConfig, sprite_name::SpriteName};

/// The JSON document written next to an atlas, describing where each sprite
/// is located.
///
/// The layout follows the "JSON hash" convention used by TexturePacker and
/// understood by most engines that load sprite sheets. Unknown fields are
/// ignored when reading so that sheets made by other tools can be unpacked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub frames: BTreeMap<SpriteName, FrameEntry>,
    pub meta: SheetMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEntry {
    /// Where this sprite is located in the atlas.
    pub frame: Rect,

    /// Always false, Spriter never rotates sprites.
    #[serde(default)]
    pub rotated: bool,

    /// Always false, Spriter never trims sprites.
    #[serde(default)]
    pub trimmed: bool,

    #[serde(default)]
    pub sprite_source_size: Rect,

    #[serde(default)]
    pub source_size: SheetSize,
}

impl FrameEntry {
    /// An entry for an untrimmed, unrotated sprite at `frame`.
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            rotated: false,
            trimmed: false,
            sprite_source_size: Rect::new(0, 0, frame.w, frame.h),
            source_size: SheetSize {
                w: frame.w,
                h: frame.h,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSize {
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetMeta {
    #[serde(default)]
    pub app: String,

    #[serde(default)]
    pub version: String,

    /// The file name of the atlas image, relative to this document.
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub format: String,

    pub size: SheetSize,

    #[serde(default)]
    pub scale: String,
}

impl SpriteSheet {
    pub fn from_pack(output: &PackOutput<SpriteName>, image: &str, meta: &MetaConfig) -> Self {
        let frames = output
            .items()
            .iter()
            .map(|item| (item.key().clone(), FrameEntry::new(item.rect())))
            .collect();

        let (w, h) = output.size();

        Self {
            frames,
            meta: SheetMeta {
                app: meta.app.clone(),
                version: meta.version.clone(),
                image: image.to_owned(),
                format: meta.format.clone(),
                size: SheetSize { w, h },
                scale: meta.scale.clone(),
            },
        }
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref();

        let file = fs::File::open(path).map_err(|source| SheetError::Io {
            path: path.to_owned(),
            source,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|source| SheetError::Json {
            path: path.to_owned(),
            source,
        })
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SheetError> {
        let path = path.as_ref();
        let io_error = |source| SheetError::Io {
            path: path.to_owned(),
            source,
        };

        let mut file = BufWriter::new(fs::File::create(path).map_err(io_error)?);

        serde_json::to_writer_pretty(&mut file, self).map_err(|source| SheetError::Json {
            path: path.to_owned(),
            source,
        })?;
        file.flush().map_err(io_error)?;

        log::trace!("Saved sprite sheet to {}", path.display());

        Ok(())
    }

    /// Checks that every frame describes a non-empty region inside of an atlas
    /// of the given size.
    pub fn validate(&self, atlas_size: (u32, u32)) -> Result<(), SheetError> {
        let size = self.meta.size;
        if (size.w, size.h) != atlas_size {
            log::warn!(
                "Sprite sheet says the atlas is {}x{}, but the image is {}x{}",
                size.w,
                size.h,
                atlas_size.0,
                atlas_size.1
            );
        }

        for (name, entry) in &self.frames {
            let frame = entry.frame;

            let max_x = frame.x.checked_add(frame.w);
            let max_y = frame.y.checked_add(frame.h);

            let in_bounds = match (max_x, max_y) {
                (Some(max_x), Some(max_y)) => max_x <= atlas_size.0 && max_y <= atlas_size.1,
                _ => false,
            };

            if frame.w == 0 || frame.h == 0 || !in_bounds {
                return Err(SheetError::FrameOutOfBounds {
                    name: name.clone(),
                    frame,
                    atlas_size,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("{source} in {}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid sprite sheet {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(
        "frame for '{name}' at ({}, {}) sized {}x{} does not fit in the {}x{} atlas",
        frame.x,
        frame.y,
        frame.w,
        frame.h,
        atlas_size.0,
        atlas_size.1
    )]
    FrameOutOfBounds {
        name: SpriteName,
        frame: Rect,
        atlas_size: (u32, u32),
    },
}

#[cfg(test)]
mod test {
    use packtree::{AtlasPacker, InputItem};
    use serde_json::json;

    use super::*;

    fn packed_sheet() -> SpriteSheet {
        let output = AtlasPacker::new()
            .padding(1)
            .pack(vec![
                InputItem::new(SpriteName::from("coin.png"), (16, 16)),
                InputItem::new(SpriteName::from("ui/button.png"), (40, 12)),
            ])
            .unwrap();

        SpriteSheet::from_pack(&output, "items.png", &MetaConfig::default())
    }

    #[test]
    fn matches_json_hash_layout() {
        let sheet = packed_sheet();
        let value = serde_json::to_value(&sheet).unwrap();

        let coin = &value["frames"]["coin.png"];
        assert_eq!(coin["rotated"], json!(false));
        assert_eq!(coin["trimmed"], json!(false));
        assert_eq!(coin["sourceSize"], json!({ "w": 16, "h": 16 }));
        assert_eq!(
            coin["spriteSourceSize"],
            json!({ "x": 0, "y": 0, "w": 16, "h": 16 })
        );
        assert_eq!(coin["frame"]["w"], json!(16));

        assert_eq!(value["meta"]["image"], json!("items.png"));
        assert_eq!(value["meta"]["format"], json!("RGBA8888"));
        assert_eq!(value["meta"]["scale"], json!("1"));
    }

    #[test]
    fn reads_sheets_from_other_tools() {
        let value = json!({
            "frames": {
                "hero.png": {
                    "frame": { "x": 2, "y": 4, "w": 8, "h": 6 },
                    "rotated": false,
                    "trimmed": false,
                    "pivot": { "x": 0.5, "y": 0.5 }
                }
            },
            "meta": {
                "app": "https://www.codeandweb.com/texturepacker",
                "size": { "w": 32, "h": 32 },
                "smartupdate": "abc"
            }
        });

        let sheet: SpriteSheet = serde_json::from_value(value).unwrap();
        let hero = &sheet.frames[&SpriteName::from("hero.png")];

        assert_eq!(hero.frame, Rect::new(2, 4, 8, 6));
        assert!(sheet.validate((32, 32)).is_ok());
    }

    #[test]
    fn frames_outside_atlas_are_rejected() {
        let mut sheet = packed_sheet();
        let atlas_size = (sheet.meta.size.w, sheet.meta.size.h);
        assert!(sheet.validate(atlas_size).is_ok());

        sheet.frames.insert(
            SpriteName::from("bad.png"),
            FrameEntry::new(Rect::new(u32::MAX, 0, 2, 2)),
        );

        match sheet.validate(atlas_size) {
            Err(SheetError::FrameOutOfBounds { name, .. }) => assert_eq!(name.as_ref(), "bad.png"),
            other => panic!("expected out of bounds error, got {:?}", other),
        }
    }

    #[test]
    fn survives_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        let sheet = packed_sheet();
        sheet.write_to_file(&path).unwrap();

        assert_eq!(SpriteSheet::read_from_file(&path).unwrap(), sheet);
    }

    #[test]
    fn missing_file_names_path() {
        let err = SpriteSheet::read_from_file("does-not-exist.json").unwrap_err();
        assert!(err.to_string().contains("does-not-exist.json"));
    }
}
