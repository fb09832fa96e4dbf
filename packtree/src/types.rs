use crate::geometry::{Rect, Size};

/// An input to [`AtlasPacker`](struct.AtlasPacker.html).
///
/// `InputItem` is a 2D size along with a key chosen by the caller. Packtree
/// never inspects keys; they're handed back untouched on the matching
/// `OutputItem` so consumers can associate results with their own objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputItem<K> {
    pub(crate) key: K,
    pub(crate) size: Size,
}

impl<K> InputItem<K> {
    #[inline]
    pub fn new<S: Into<Size>>(key: K, size: S) -> Self {
        Self {
            key,
            size: size.into(),
        }
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }
}

/// An item that was placed by a packing run.
///
/// `OutputItem` corresponds 1:1 to the `InputItem` values passed into the
/// packer. The rectangle covers the item itself and never includes padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem<K> {
    pub(crate) key: K,
    pub(crate) rect: Rect,
}

impl<K> OutputItem<K> {
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn position(&self) -> (u32, u32) {
        self.rect.min()
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.rect.size()
    }

    #[inline]
    pub fn max(&self) -> (u32, u32) {
        self.rect.max()
    }

    pub fn into_parts(self) -> (K, Rect) {
        (self.key, self.rect)
    }
}

/// The results from a successful packing run.
#[derive(Debug, Clone)]
pub struct PackOutput<K> {
    pub(crate) size: (u32, u32),
    pub(crate) items: Vec<OutputItem<K>>,
}

impl<K> PackOutput<K> {
    /// The tight size of the packed surface: just large enough to hold every
    /// item along with its padding.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Placements in the order they were inserted.
    #[inline]
    pub fn items(&self) -> &[OutputItem<K>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<OutputItem<K>> {
        self.items
    }

    /// How much of the packed surface is covered by items, from 0 to 1.
    pub fn occupancy(&self) -> f64 {
        let total = u64::from(self.size.0) * u64::from(self.size.1);
        if total == 0 {
            return 0.0;
        }

        let used: u64 = self.items.iter().map(|item| item.rect.area()).sum();
        used as f64 / total as f64
    }
}
