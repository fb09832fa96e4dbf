use serde::{Deserialize, Serialize};

/// The size of something that should be placed by a packer.
///
/// A `Size` has no position. Placement results are always returned as
/// [`Rect`][Rect] values, so a request can never be mistaken for a placed
/// item.
///
/// [Rect]: struct.Rect.html
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    #[inline]
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// Whether this size covers no area at all. Empty sizes can't be placed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// True if this size is no wider and no taller than `outer`.
    #[inline]
    pub fn fits_in(&self, outer: &Rect) -> bool {
        self.w <= outer.w && self.h <= outer.h
    }

    /// True if this size exactly matches the size of `other`. The position of
    /// `other` is ignored.
    #[inline]
    pub fn same_size_as(&self, other: &Rect) -> bool {
        self.w == other.w && self.h == other.h
    }
}

impl From<(u32, u32)> for Size {
    fn from((w, h): (u32, u32)) -> Self {
        Size::new(w, h)
    }
}

/// An axis-aligned rectangle with a position, either a region of free space
/// or the final location of a placed item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    #[inline]
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle of the given size positioned at the origin.
    #[inline]
    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.w, size.h)
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    #[inline]
    pub fn min(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// The exclusive bottom-right corner of this rectangle.
    #[inline]
    pub fn max(&self) -> (u32, u32) {
        (self.x + self.w, self.y + self.h)
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.size().area()
    }

    #[inline]
    pub fn fits_in(&self, outer: &Rect) -> bool {
        self.size().fits_in(outer)
    }

    #[inline]
    pub fn same_size_as(&self, other: &Rect) -> bool {
        self.size().same_size_as(other)
    }

    /// Tells whether the two rectangles share any area. Rectangles that only
    /// touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (self_max_x, self_max_y) = self.max();
        let (other_max_x, other_max_y) = other.max();

        self.x < other_max_x && other.x < self_max_x && self.y < other_max_y && other.y < self_max_y
    }

    /// Tells whether `other` lies entirely inside of this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        let (self_max_x, self_max_y) = self.max();
        let (other_max_x, other_max_y) = other.max();

        other.x >= self.x && other.y >= self.y && other_max_x <= self_max_x && other_max_y <= self_max_y
    }
}
