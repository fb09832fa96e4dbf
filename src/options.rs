use std::{path::PathBuf, str::FromStr};

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Packs folders of images into texture atlases and unpacks them again")]
pub struct Options {
    #[structopt(flatten)]
    pub global: GlobalOptions,

    #[structopt(subcommand)]
    pub command: Subcommand,
}

#[derive(Debug, StructOpt)]
pub struct GlobalOptions {
    /// Sets verbosity level. Can be specified multiple times.
    #[structopt(long = "verbose", short, global = true, parse(from_occurrences))]
    pub verbosity: u8,
}

#[derive(Debug, StructOpt)]
pub enum Subcommand {
    /// Pack every image in a folder into a single PNG atlas, along with a JSON
    /// file describing where each image ended up.
    Pack(PackOptions),

    /// Split an atlas back into individual images using its JSON file.
    Unpack(UnpackOptions),
}

#[derive(Debug, StructOpt)]
pub struct PackOptions {
    /// The folder containing the images to pack.
    pub folder: PathBuf,

    /// Where to write the atlas and its JSON file. Defaults to a sibling of
    /// the input folder with "-new" appended to its name.
    #[structopt(long, short)]
    pub output: Option<PathBuf>,

    /// Transparent pixels to keep between images. Overrides the value from
    /// spriter.toml, which defaults to 1.
    #[structopt(long)]
    pub padding: Option<u32>,

    /// The largest atlas Spriter is allowed to produce, like "2048x2048".
    #[structopt(long)]
    pub max_size: Option<Dimensions>,
}

#[derive(Debug, StructOpt)]
pub struct UnpackOptions {
    /// The JSON file describing the atlas.
    pub sheet: PathBuf,

    /// The atlas image. Defaults to the image named in the JSON file.
    #[structopt(long)]
    pub image: Option<PathBuf>,

    /// Where to write the extracted images. Defaults to the path of the JSON
    /// file without its extension.
    #[structopt(long, short)]
    pub output: Option<PathBuf>,
}

/// A width and height given on the command line as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions(pub u32, pub u32);

impl FromStr for Dimensions {
    type Err = String;

    fn from_str(value: &str) -> Result<Dimensions, Self::Err> {
        let invalid = || {
            format!(
                "Invalid size '{}'. Sizes should look like '1024x1024'.",
                value
            )
        };

        let mut parts = value.splitn(2, |c| c == 'x' || c == 'X');
        let width = parts.next().ok_or_else(invalid)?;
        let height = parts.next().ok_or_else(invalid)?;

        let width = width.trim().parse().map_err(|_| invalid())?;
        let height = height.trim().parse().map_err(|_| invalid())?;

        Ok(Dimensions(width, height))
    }
}
