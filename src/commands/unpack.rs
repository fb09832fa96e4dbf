use std::{
    collections::HashMap,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{data::SpriteSheet, image::Image, options::UnpackOptions, sprite_name::SpriteName};

pub fn unpack(options: UnpackOptions) -> anyhow::Result<()> {
    let sheet = SpriteSheet::read_from_file(&options.sheet)?;

    let image_path = match options.image {
        Some(path) => path,
        None => locate_atlas(&options.sheet, &sheet),
    };

    log::debug!("Reading atlas from {}", image_path.display());

    let atlas = Image::decode_png(BufReader::new(fs::File::open(&image_path)?))
        .with_context(|| format!("could not decode atlas {}", image_path.display()))?;

    sheet.validate(atlas.size())?;

    let sheet_path = &options.sheet;
    let output_folder = options
        .output
        .unwrap_or_else(|| sheet_path.with_extension(""));

    fs::create_dir_all(&output_folder)?;

    let progress = ProgressBar::new(sheet.frames.len() as u64);
    progress.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {msg}"));

    // Distinct names can clean up to the same file, like `../b.png` and
    // `b.png`. The first frame written to a path wins.
    let mut written: HashMap<PathBuf, &SpriteName> = HashMap::new();

    for (name, entry) in &sheet.frames {
        let path = name.output_path(&output_folder);
        if path == output_folder {
            log::warn!("Skipping frame with unusable name '{}'", name);
            progress.inc(1);
            continue;
        }

        if let Some(previous) = written.get(&path) {
            log::warn!(
                "Skipping frame '{}', it would overwrite '{}' at {}",
                name,
                previous,
                path.display()
            );
            progress.inc(1);
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let sprite = atlas.sub_image(entry.frame);

        let mut file = BufWriter::new(fs::File::create(&path)?);
        sprite
            .encode_png(&mut file)
            .with_context(|| format!("could not encode {}", path.display()))?;
        file.flush()?;

        log::info!("Export: {}", name);
        written.insert(path, name);
        progress.set_message(name.to_string());
        progress.inc(1);
    }

    progress.finish_and_clear();

    log::info!(
        "Unpacked {} sprites into {}",
        written.len(),
        output_folder.display()
    );

    Ok(())
}

/// Finds the atlas image for a sheet: the image named in the sheet's metadata
/// if it exists, otherwise a PNG next to the sheet with the same name.
fn locate_atlas(sheet_path: &Path, sheet: &SpriteSheet) -> PathBuf {
    if !sheet.meta.image.is_empty() {
        let named = match sheet_path.parent() {
            Some(folder) => folder.join(&sheet.meta.image),
            None => PathBuf::from(&sheet.meta.image),
        };

        if named.is_file() {
            return named;
        }

        log::debug!(
            "Atlas {} named by sheet does not exist, falling back",
            named.display()
        );
    }

    sheet_path.with_extension("png")
}
