//! Simple containers to track images and perform operations on them.
//!
//! Every pack or unpack run creates its own `Image` values; nothing here is
//! shared between runs.

use std::io::{Read, Write};

use packtree::Rect;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    Rgba8,
}

impl ImageFormat {
    fn stride(&self) -> usize {
        match self {
            ImageFormat::Rgba8 => 4,
        }
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[cfg(test)]
impl Pixel {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Image {
    size: (u32, u32),
    data: Vec<u8>,
    format: ImageFormat,
}

impl Image {
    pub fn new_rgba8<D: Into<Vec<u8>>>(size: (u32, u32), data: D) -> Self {
        let data = data.into();
        let format = ImageFormat::Rgba8;

        assert!(data.len() == pixel_count(size) * format.stride());

        Self { size, data, format }
    }

    pub fn new_empty_rgba8(size: (u32, u32)) -> Self {
        let data = vec![0; pixel_count(size) * ImageFormat::Rgba8.stride()];
        Self::new_rgba8(size, data)
    }

    /// Decodes a PNG of any color type and bit depth into 8-bit RGBA.
    pub fn decode_png<R: Read>(input: R) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(input);

        // Palettes and low bit depths are expanded, 16-bit channels are
        // narrowed to 8 bits. What's left is converted to RGBA below.
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

        let (info, mut reader) = decoder.read_info()?;

        if info.bit_depth != png::BitDepth::Eight {
            return Err(ImageError::Unsupported {
                color_type: info.color_type,
                bit_depth: info.bit_depth,
            });
        }

        let mut buffer = vec![0; info.buffer_size()];
        reader.next_frame(&mut buffer)?;

        let size = (info.width, info.height);
        let pixels = pixel_count(size);
        let mut data = Vec::with_capacity(pixels * ImageFormat::Rgba8.stride());

        match info.color_type {
            png::ColorType::RGBA => {
                data.extend_from_slice(&buffer[..pixels * 4]);
            }
            png::ColorType::RGB => {
                for rgb in buffer.chunks_exact(3).take(pixels) {
                    data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
                }
            }
            png::ColorType::GrayscaleAlpha => {
                for la in buffer.chunks_exact(2).take(pixels) {
                    data.extend_from_slice(&[la[0], la[0], la[0], la[1]]);
                }
            }
            png::ColorType::Grayscale => {
                for &l in buffer.iter().take(pixels) {
                    data.extend_from_slice(&[l, l, l, 255]);
                }
            }
            color_type => {
                return Err(ImageError::Unsupported {
                    color_type,
                    bit_depth: info.bit_depth,
                })
            }
        }

        Ok(Self::new_rgba8(size, data))
    }

    pub fn encode_png<W: Write>(&self, output: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(output, self.size.0, self.size.1);

        match self.format {
            ImageFormat::Rgba8 => {
                encoder.set_color(png::ColorType::RGBA);
                encoder.set_depth(png::BitDepth::Eight);
            }
        }

        let mut output_writer = encoder.write_header()?;
        output_writer.write_image_data(&self.data)?;

        // On drop, output_writer will write the last chunk of the PNG file.
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Copies all of `other` into this image with its top-left corner at
    /// `pos`. The whole source must fit.
    pub fn blit(&mut self, other: &Image, pos: (u32, u32)) {
        assert!(self.format == ImageFormat::Rgba8 && other.format == ImageFormat::Rgba8);
        assert!(pos.0 + other.size.0 <= self.size.0);
        assert!(pos.1 + other.size.1 <= self.size.1);

        let stride = self.format.stride();

        let other_width_bytes = other.size.0 as usize * stride;
        if other_width_bytes == 0 {
            return;
        }

        let other_rows = other.data.chunks_exact(other_width_bytes);

        for (other_y, other_row) in other_rows.enumerate() {
            let self_y = pos.1 as usize + other_y;

            let start_px = pos.0 as usize + self.size.0 as usize * self_y;

            let start_in_bytes = stride * start_px;
            let end_in_bytes = start_in_bytes + other_row.len();

            let self_row = &mut self.data[start_in_bytes..end_in_bytes];
            self_row.copy_from_slice(other_row);
        }
    }

    /// Copies the region described by `rect` out into a new image. The region
    /// must lie inside of this image.
    pub fn sub_image(&self, rect: Rect) -> Image {
        let (max_x, max_y) = rect.max();
        assert!(max_x <= self.size.0 && max_y <= self.size.1);

        let stride = self.format.stride();
        let row_bytes = rect.w as usize * stride;

        let mut data = Vec::with_capacity(row_bytes * rect.h as usize);

        for y in rect.y..max_y {
            let start = stride * (rect.x as usize + y as usize * self.size.0 as usize);
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }

        Image::new_rgba8((rect.w, rect.h), data)
    }

    #[cfg(test)]
    pub fn get_pixel(&self, pos: (u32, u32)) -> Pixel {
        assert!(pos.0 < self.size.0);
        assert!(pos.1 < self.size.1);

        let stride = self.format.stride();
        let start = stride * (pos.0 as usize + pos.1 as usize * self.size.0 as usize);

        Pixel {
            r: self.data[start],
            g: self.data[start + 1],
            b: self.data[start + 2],
            a: self.data[start + 3],
        }
    }

    #[cfg(test)]
    pub fn set_pixel(&mut self, pos: (u32, u32), pixel: Pixel) {
        assert!(pos.0 < self.size.0);
        assert!(pos.1 < self.size.1);

        let stride = self.format.stride();
        let start = stride * (pos.0 as usize + pos.1 as usize * self.size.0 as usize);

        self.data[start] = pixel.r;
        self.data[start + 1] = pixel.g;
        self.data[start + 2] = pixel.b;
        self.data[start + 3] = pixel.a;
    }
}

fn pixel_count(size: (u32, u32)) -> usize {
    size.0 as usize * size.1 as usize
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Decoding {
        #[from]
        source: png::DecodingError,
    },

    #[error("unsupported PNG format {color_type:?} at {bit_depth:?}")]
    Unsupported {
        color_type: png::ColorType,
        bit_depth: png::BitDepth,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blit_zero() {
        let source = Image::new_empty_rgba8((17, 20));
        let mut target = Image::new_empty_rgba8((17, 20));

        target.blit(&source, (0, 0));
    }

    #[test]
    fn blit_corner() {
        let mut source = Image::new_empty_rgba8((4, 4));
        source.set_pixel((3, 3), Pixel::new(9, 8, 7, 6));

        let mut target = Image::new_empty_rgba8((8, 8));
        target.blit(&source, (4, 4));

        assert_eq!(target.get_pixel((7, 7)), Pixel::new(9, 8, 7, 6));
        assert_eq!(target.get_pixel((3, 3)), Pixel::new(0, 0, 0, 0));
    }

    #[test]
    #[should_panic]
    fn blit_out_of_bounds() {
        let source = Image::new_empty_rgba8((4, 4));
        let mut target = Image::new_empty_rgba8((8, 8));

        target.blit(&source, (5, 0));
    }

    #[test]
    fn sub_image_copies_region() {
        let mut source = Image::new_empty_rgba8((5, 4));
        source.set_pixel((1, 2), Pixel::new(1, 2, 3, 4));
        source.set_pixel((3, 3), Pixel::new(5, 6, 7, 8));

        let cropped = source.sub_image(Rect::new(1, 2, 3, 2));

        assert_eq!(cropped.size(), (3, 2));
        assert_eq!(cropped.get_pixel((0, 0)), Pixel::new(1, 2, 3, 4));
        assert_eq!(cropped.get_pixel((2, 1)), Pixel::new(5, 6, 7, 8));
        assert_eq!(cropped.get_pixel((1, 0)), Pixel::new(0, 0, 0, 0));
    }

    #[test]
    fn set_pixel() {
        let mut source = Image::new_empty_rgba8((3, 3));

        source.set_pixel((0, 0), Pixel::new(1, 2, 3, 4));
        assert_eq!(source.get_pixel((0, 0)), Pixel::new(1, 2, 3, 4));

        source.set_pixel((2, 2), Pixel::new(5, 6, 7, 8));
        assert_eq!(source.get_pixel((2, 2)), Pixel::new(5, 6, 7, 8));

        assert_eq!(&source.data[0..4], &[1, 2, 3, 4]);
        assert_eq!(&source.data[(source.data.len() - 4)..], &[5, 6, 7, 8]);
    }

    #[test]
    fn pixel_count_does_not_wrap() {
        // 70000 * 70000 * 4 bytes is well past u32::MAX.
        assert_eq!(pixel_count((70_000, 70_000)) * 4, 19_600_000_000);
    }

    #[test]
    fn png_round_trip_keeps_pixels() {
        let mut source = Image::new_empty_rgba8((2, 3));
        source.set_pixel((1, 2), Pixel::new(200, 100, 50, 25));

        let mut encoded = Vec::new();
        source.encode_png(&mut encoded).unwrap();

        let decoded = Image::decode_png(encoded.as_slice()).unwrap();
        assert_eq!(decoded.size(), (2, 3));
        assert_eq!(decoded.get_pixel((1, 2)), Pixel::new(200, 100, 50, 25));
    }

    #[test]
    fn decodes_rgb_as_opaque() {
        let mut encoded = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut encoded, 2, 1);
            encoder.set_color(png::ColorType::RGB);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[10, 20, 30, 40, 50, 60]).unwrap();
        }

        let decoded = Image::decode_png(encoded.as_slice()).unwrap();
        assert_eq!(decoded.get_pixel((0, 0)), Pixel::new(10, 20, 30, 255));
        assert_eq!(decoded.get_pixel((1, 0)), Pixel::new(40, 50, 60, 255));
    }
}
