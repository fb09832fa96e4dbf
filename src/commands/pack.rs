use std::{
    collections::BTreeMap,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use packtree::{AtlasPacker, InputItem, PackOutput};
use walkdir::WalkDir;

use crate::{
    data::{Config, SpriteSheet},
    image::Image,
    options::{Dimensions, PackOptions},
    sprite_name::SpriteName,
};

pub fn pack(options: PackOptions) -> anyhow::Result<()> {
    let folder = std::fs::canonicalize(&options.folder)
        .with_context(|| format!("could not find folder {}", options.folder.display()))?;

    let atlas_name = match folder.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.to_owned(),
        None => bail!("folder {} needs a valid name", folder.display()),
    };

    let mut config = Config::read_from_folder_or_default(&folder)?;

    if let Some(padding) = options.padding {
        config.padding = padding;
    }

    if let Some(Dimensions(width, height)) = options.max_size {
        config.max_size = Some((width, height));
    }

    let output_folder = options
        .output
        .or_else(|| config.output_folder())
        .unwrap_or_else(|| folder.with_file_name(format!("{}-new", atlas_name)));

    let mut session = PackSession::new(folder, config);
    session.discover_sprites(&output_folder)?;
    session.decode_sprites()?;

    let output = session.pack()?;
    let atlas = session.composite(&output)?;

    let image_file_name = format!("{}.png", atlas_name);
    let sheet = SpriteSheet::from_pack(&output, &image_file_name, &session.config.meta);

    fs::create_dir_all(&output_folder)?;

    let image_path = output_folder.join(&image_file_name);
    let mut image_file = BufWriter::new(fs::File::create(&image_path)?);
    atlas
        .encode_png(&mut image_file)
        .with_context(|| format!("could not encode atlas {}", image_path.display()))?;
    image_file.flush()?;

    let sheet_path = output_folder.join(format!("{}.json", atlas_name));
    sheet.write_to_file(&sheet_path)?;

    log::info!(
        "Packed {} sprites into {} ({}x{}, {:.1}% used)",
        output.items().len(),
        image_path.display(),
        atlas.size().0,
        atlas.size().1,
        output.occupancy() * 100.0
    );

    Ok(())
}

/// Holds all of the state for a single run of the 'spriter pack' command.
struct PackSession {
    /// The folder being packed. Sprite names are relative to this folder.
    root: PathBuf,

    config: Config,

    /// Paths of every sprite found during discovery.
    paths: BTreeMap<SpriteName, PathBuf>,

    /// Decoded sprites, filled in after discovery.
    images: BTreeMap<SpriteName, Image>,
}

impl PackSession {
    fn new(root: PathBuf, config: Config) -> Self {
        log::trace!("Starting new pack session in {}", root.display());

        Self {
            root,
            config,
            paths: BTreeMap::new(),
            images: BTreeMap::new(),
        }
    }

    /// Find every file in the folder matched by the configured glob, skipping
    /// anything inside of `output_folder`.
    fn discover_sprites(&mut self, output_folder: &Path) -> anyhow::Result<()> {
        let glob = &self.config.glob;
        let base_path = self.root.join(glob.get_prefix());

        log::debug!(
            "Searching for sprites in '{}' matching '{}'",
            base_path.display(),
            glob
        );

        // Walked paths are canonical since the root is, so the output folder
        // has to be too for the comparison to work.
        let output_folder = std::fs::canonicalize(output_folder)
            .unwrap_or_else(|_| output_folder.to_path_buf());

        let walker = WalkDir::new(&base_path)
            .into_iter()
            .filter_entry(|entry| entry.path() != output_folder);

        for entry in walker {
            let entry = entry.with_context(|| format!("could not search {}", base_path.display()))?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = match SpriteName::from_paths(&self.root, entry.path()) {
                Some(name) => name,
                None => continue,
            };

            let relative: &str = name.as_ref();
            if !glob.is_match(relative) {
                continue;
            }

            log::trace!("Found sprite {}", name);
            self.paths.insert(name, entry.into_path());
        }

        if self.paths.is_empty() {
            bail!(
                "no images in {} matched '{}'",
                self.root.display(),
                self.config.glob
            );
        }

        Ok(())
    }

    fn decode_sprites(&mut self) -> anyhow::Result<()> {
        for (name, path) in &self.paths {
            let file = BufReader::new(fs::File::open(path)?);
            let image = Image::decode_png(file)
                .with_context(|| format!("could not decode image {}", path.display()))?;

            log::trace!("Decoded {} ({}x{})", name, image.size().0, image.size().1);
            self.images.insert(name.clone(), image);
        }

        Ok(())
    }

    fn pack(&self) -> anyhow::Result<PackOutput<SpriteName>> {
        let items = self
            .images
            .iter()
            .map(|(name, image)| InputItem::new(name.clone(), image.size()));

        let mut packer = AtlasPacker::new().padding(self.config.padding);
        if let Some(max_size) = self.config.max_size {
            packer = packer.max_size(max_size);
        }

        let output = packer
            .pack(items)
            .with_context(|| format!("could not pack {}", self.root.display()))?;

        Ok(output)
    }

    /// Draws every sprite into a new image the size of the packed atlas.
    fn composite(&self, output: &PackOutput<SpriteName>) -> anyhow::Result<Image> {
        let mut atlas = Image::new_empty_rgba8(output.size());

        let progress = ProgressBar::new(output.items().len() as u64);
        progress.set_style(
            ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {msg}"),
        );

        for item in output.items() {
            let name = item.key();
            log::info!("Draw: {}", name);
            progress.set_message(name.to_string());

            let image = match self.images.get(name) {
                Some(image) => image,
                None => bail!("sprite {} was packed but never decoded", name),
            };

            atlas.blit(image, item.position());
            progress.inc(1);
        }

        progress.finish_and_clear();

        Ok(atlas)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    use crate::image::Pixel;

    /// Writes a solid-colored PNG of the given size.
    pub(crate) fn write_sprite(path: &Path, size: (u32, u32), color: Pixel) {
        let mut image = Image::new_empty_rgba8(size);
        for y in 0..size.1 {
            for x in 0..size.0 {
                image.set_pixel((x, y), color);
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        let file = fs::File::create(path).unwrap();
        image.encode_png(file).unwrap();
    }

    fn options(folder: PathBuf) -> PackOptions {
        PackOptions {
            folder,
            output: None,
            padding: None,
            max_size: None,
        }
    }

    #[test]
    fn packs_folder_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("icons");

        write_sprite(&folder.join("red.png"), (8, 20), Pixel::new(255, 0, 0, 255));
        write_sprite(&folder.join("green.png"), (16, 4), Pixel::new(0, 255, 0, 255));
        write_sprite(&folder.join("blue.png"), (5, 5), Pixel::new(0, 0, 255, 128));
        fs::write(folder.join("readme.txt"), "not an image").unwrap();

        pack(options(folder)).unwrap();

        let output_folder = dir.path().join("icons-new");
        let sheet = SpriteSheet::read_from_file(output_folder.join("icons.json")).unwrap();
        let atlas_file = fs::File::open(output_folder.join("icons.png")).unwrap();
        let atlas = Image::decode_png(atlas_file).unwrap();

        assert_eq!(sheet.meta.image, "icons.png");
        assert_eq!((sheet.meta.size.w, sheet.meta.size.h), atlas.size());
        assert_eq!(sheet.frames.len(), 3);
        sheet.validate(atlas.size()).unwrap();

        let red = &sheet.frames[&SpriteName::from("red.png")];
        assert_eq!((red.frame.w, red.frame.h), (8, 20));
        assert_eq!(
            atlas.get_pixel((red.frame.x, red.frame.y)),
            Pixel::new(255, 0, 0, 255)
        );

        let blue = &sheet.frames[&SpriteName::from("blue.png")];
        let (max_x, max_y) = blue.frame.max();
        assert_eq!(
            atlas.get_pixel((max_x - 1, max_y - 1)),
            Pixel::new(0, 0, 255, 128)
        );

        // The default one pixel gutter stays transparent.
        assert_eq!(atlas.get_pixel((0, 0)), Pixel::new(0, 0, 0, 0));
    }

    #[test]
    fn config_file_controls_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("ui");

        write_sprite(&folder.join("top.png"), (4, 4), Pixel::new(1, 1, 1, 255));
        write_sprite(
            &folder.join("buttons").join("ok.png"),
            (6, 3),
            Pixel::new(2, 2, 2, 255),
        );
        fs::write(
            folder.join("spriter.toml"),
            "padding = 0\nglob = \"**/*.png\"\noutput = \"../build\"\n",
        )
        .unwrap();

        pack(options(folder)).unwrap();

        let sheet = SpriteSheet::read_from_file(dir.path().join("build").join("ui.json")).unwrap();

        let names: Vec<_> = sheet.frames.keys().map(|name| name.to_string()).collect();
        assert_eq!(names, vec!["buttons/ok.png", "top.png"]);

        // Without padding, the tallest sprite is placed first, in the corner.
        let top = &sheet.frames[&SpriteName::from("top.png")];
        assert_eq!((top.frame.x, top.frame.y), (0, 0));
    }

    #[test]
    fn reports_sprite_that_does_not_fit() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("big");

        write_sprite(&folder.join("wide.png"), (40, 2), Pixel::new(1, 2, 3, 4));

        let mut options = options(folder);
        options.max_size = Some(Dimensions(16, 16));

        let err = pack(options).unwrap_err();
        assert!(format!("{:?}", err).contains("wide.png"));
    }

    #[test]
    fn max_size_includes_gutter() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("tight");

        write_sprite(&folder.join("fits.png"), (14, 14), Pixel::new(1, 1, 1, 255));

        let mut fitting = options(folder.clone());
        fitting.max_size = Some(Dimensions(16, 16));
        pack(fitting).unwrap();

        let sheet =
            SpriteSheet::read_from_file(dir.path().join("tight-new").join("tight.json")).unwrap();
        assert_eq!((sheet.meta.size.w, sheet.meta.size.h), (16, 16));

        write_sprite(&folder.join("fits.png"), (15, 15), Pixel::new(1, 1, 1, 255));

        let mut too_big = options(folder);
        too_big.max_size = Some(Dimensions(16, 16));
        let err = pack(too_big).unwrap_err();
        assert!(format!("{:?}", err).contains("fits.png"));
    }

    #[test]
    fn composite_requires_decoded_sprites() {
        let dir = tempfile::tempdir().unwrap();
        let session = PackSession::new(dir.path().to_path_buf(), Config::default());

        let output = AtlasPacker::new()
            .pack(vec![InputItem::new(SpriteName::from("ghost.png"), (2, 2))])
            .unwrap();

        let err = session.composite(&output).unwrap_err();
        assert!(err.to_string().contains("ghost.png"));
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("nothing");
        fs::create_dir_all(&folder).unwrap();

        assert!(pack(options(folder)).is_err());
    }
}
