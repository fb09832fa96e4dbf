use std::fmt;

use thiserror::Error;

use crate::{
    geometry::{Rect, Size},
    tree::PackingTree,
    types::{InputItem, OutputItem, PackOutput},
};

/// How `AtlasPacker` picks the region it starts packing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingPolicy {
    /// Start from a quarter of the summed widths and the summed heights of
    /// all items, never smaller than the largest item. When an item doesn't
    /// fit, the region is doubled and the whole run is retried.
    Reference,

    /// Pack into exactly this region and fail if anything doesn't fit. The
    /// region is still shrunk to leave room for padding within `max_size`.
    Exact(u32, u32),
}

impl Default for SizingPolicy {
    fn default() -> Self {
        SizingPolicy::Reference
    }
}

/// Packs a set of items into a single surface using a
/// [`PackingTree`](struct.PackingTree.html).
///
/// Items are placed tallest first. Once everything has a place, the output
/// is trimmed down to the bounding box of the placements.
#[derive(Debug, Clone)]
pub struct AtlasPacker {
    padding: u32,
    max_size: Option<(u32, u32)>,
    sizing: SizingPolicy,
}

impl Default for AtlasPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl AtlasPacker {
    pub fn new() -> Self {
        Self {
            padding: 0,
            max_size: None,
            sizing: SizingPolicy::Reference,
        }
    }

    /// Empty pixels to keep between items and around the edge of the output.
    pub fn padding(self, padding: u32) -> Self {
        Self { padding, ..self }
    }

    /// Caps how large the packing region is allowed to grow.
    pub fn max_size(self, max_size: (u32, u32)) -> Self {
        Self {
            max_size: Some(max_size),
            ..self
        }
    }

    pub fn sizing(self, sizing: SizingPolicy) -> Self {
        Self { sizing, ..self }
    }

    pub fn pack<K, I>(&self, items: I) -> Result<PackOutput<K>, PackError>
    where
        K: fmt::Display,
        I: IntoIterator<Item = InputItem<K>>,
    {
        let mut items: Vec<_> = items.into_iter().collect();

        if let Some(item) = items.iter().find(|item| item.size.is_empty()) {
            return Err(PackError::InvalidItem {
                key: item.key.to_string(),
                size: item.size,
            });
        }

        if items.is_empty() {
            return Ok(PackOutput {
                size: (0, 0),
                items: Vec::new(),
            });
        }

        // Tallest first. The sort is stable, so ties keep the caller's order.
        items.sort_by(|a, b| b.size.h.cmp(&a.size.h));

        let padding = self.padding;
        let limit = self.limit();

        let mut requests = Vec::with_capacity(items.len());
        for item in &items {
            let padded = item
                .size
                .w
                .checked_add(padding)
                .zip(item.size.h.checked_add(padding));

            match padded {
                Some((w, h)) => requests.push(Size::new(w, h)),
                None => {
                    return Err(PackError::DoesNotFit {
                        key: item.key.to_string(),
                        size: item.size,
                        region: Size::new(limit.0, limit.1),
                    })
                }
            }
        }

        log::trace!("Packing {} items", items.len());

        let mut region = self.initial_region(&requests);

        let slots = loop {
            match pack_region(&requests, region) {
                Ok(slots) => break slots,
                Err(failed) => match self.grow(region) {
                    Some(next) => {
                        log::debug!(
                            "Item {} did not fit in {}x{}, retrying with {}x{}",
                            items[failed].key,
                            region.w,
                            region.h,
                            next.w,
                            next.h
                        );

                        region = next;
                    }
                    None => {
                        let item = &items[failed];

                        return Err(PackError::DoesNotFit {
                            key: item.key.to_string(),
                            size: item.size,
                            region: region.size(),
                        });
                    }
                },
            }
        };

        let mut size = (0, 0);
        let output_items: Vec<_> = items
            .into_iter()
            .zip(slots)
            .map(|(item, slot)| {
                let rect = Rect::new(
                    slot.x + padding,
                    slot.y + padding,
                    item.size.w,
                    item.size.h,
                );

                let (max_x, max_y) = rect.max();
                size.0 = size.0.max(max_x);
                size.1 = size.1.max(max_y);

                OutputItem {
                    key: item.key,
                    rect,
                }
            })
            .collect();

        // Every slot lies inside the region, which leaves room for the
        // trailing gutter within the limit.
        let size = (size.0 + padding, size.1 + padding);

        log::trace!(
            "Finished packing {} items into {}x{}",
            output_items.len(),
            size.0,
            size.1
        );

        Ok(PackOutput {
            size,
            items: output_items,
        })
    }

    /// The largest region that can be packed into. The trailing gutter has to
    /// fit after it, both within `max_size` and within `u32`.
    fn limit(&self) -> (u32, u32) {
        let (max_width, max_height) = self.max_size.unwrap_or((u32::MAX, u32::MAX));

        (
            max_width.saturating_sub(self.padding),
            max_height.saturating_sub(self.padding),
        )
    }

    fn initial_region(&self, requests: &[Size]) -> Rect {
        let (width, height) = match self.sizing {
            SizingPolicy::Exact(width, height) => (width, height),
            SizingPolicy::Reference => {
                let total_width: u64 = requests.iter().map(|size| u64::from(size.w)).sum();
                let total_height: u64 = requests.iter().map(|size| u64::from(size.h)).sum();

                let widest = requests.iter().map(|size| size.w).max().unwrap_or(0);
                let tallest = requests.iter().map(|size| size.h).max().unwrap_or(0);

                (
                    clamp_to_u32(total_width / 4).max(widest),
                    clamp_to_u32(total_height).max(tallest),
                )
            }
        };

        let (max_width, max_height) = self.limit();
        Rect::new(0, 0, width.min(max_width), height.min(max_height))
    }

    /// Computes the next region to try after a failed run, or `None` if the
    /// region can't get any bigger.
    fn grow(&self, region: Rect) -> Option<Rect> {
        if let SizingPolicy::Exact(..) = self.sizing {
            return None;
        }

        let (max_width, max_height) = self.limit();
        let width = region.w.saturating_mul(2).max(1).min(max_width);
        let height = region.h.saturating_mul(2).max(1).min(max_height);

        if width <= region.w && height <= region.h {
            None
        } else {
            Some(Rect::new(0, 0, width.max(region.w), height.max(region.h)))
        }
    }
}

/// Packs every request into a fresh tree covering `region`. On failure,
/// returns the index of the first request that didn't fit.
fn pack_region(requests: &[Size], region: Rect) -> Result<Vec<Rect>, usize> {
    log::trace!(
        "Trying to pack {} items into region of size {}x{}",
        requests.len(),
        region.w,
        region.h
    );

    let mut tree = PackingTree::new(region);

    requests
        .iter()
        .enumerate()
        .map(|(index, &size)| tree.insert(size).map_err(|_| index))
        .collect()
}

fn clamp_to_u32(value: u64) -> u32 {
    value.min(u64::from(u32::MAX)) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("item '{key}' has an empty size of {}x{}", size.w, size.h)]
    InvalidItem { key: String, size: Size },

    #[error(
        "could not place item '{key}' ({}x{}), the packing region cannot grow past {}x{}",
        size.w,
        size.h,
        region.w,
        region.h
    )]
    DoesNotFit {
        key: String,
        size: Size,
        region: Size,
    },
}
