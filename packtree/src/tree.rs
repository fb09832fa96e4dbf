use thiserror::Error;

use crate::geometry::{Rect, Size};

/// A binary space-partitioning tree that hands out non-overlapping regions of
/// a fixed root rectangle.
///
/// Every insertion walks the tree depth-first, left before right, and either
/// claims a leaf whose size exactly matches the request or splits the first
/// leaf large enough to hold it. Nodes are never merged or removed, so a tree
/// should be thrown away once a packing run is done with it.
#[derive(Debug, Clone)]
pub struct PackingTree {
    root: Node,
}

#[derive(Debug, Clone)]
struct Node {
    rect: Rect,
    occupied: bool,

    /// Once a node has been split, it's never considered for placement again;
    /// only its two children are. The children always partition `rect`
    /// exactly.
    children: Option<Box<[Node; 2]>>,
}

impl PackingTree {
    pub fn new(initial_region: Rect) -> Self {
        Self {
            root: Node::new(initial_region),
        }
    }

    /// The region this tree was created with.
    #[inline]
    pub fn region(&self) -> Rect {
        self.root.rect
    }

    /// Attempts to find a spot for an item of the given size.
    ///
    /// On success, returns the absolute rectangle that the item now occupies.
    /// Failing to find space is an expected outcome and leaves the tree in a
    /// usable state, though it may have been subdivided along the way.
    pub fn insert(&mut self, size: Size) -> Result<Rect, InsertError> {
        if size.is_empty() {
            return Err(InsertError::InvalidSize { size });
        }

        match self.root.insert(size) {
            Some(rect) => {
                log::trace!("Placed {}x{} at ({}, {})", size.w, size.h, rect.x, rect.y);
                Ok(rect)
            }
            None => {
                log::trace!("No space left for {}x{}", size.w, size.h);
                Err(InsertError::NoSpace { size })
            }
        }
    }

    /// The total number of nodes in the tree, including the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.root.visit_leaves_and_branches(&mut |_| count += 1);
        count
    }

    /// All of the regions that have been handed out so far, in depth-first
    /// order.
    pub fn placements(&self) -> Vec<Rect> {
        self.leaves(true)
    }

    /// All leaves that haven't been claimed yet. Together with
    /// [`placements`](#method.placements), these exactly tile the root region.
    pub fn free_regions(&self) -> Vec<Rect> {
        self.leaves(false)
    }

    pub fn occupied_area(&self) -> u64 {
        self.placements().iter().map(Rect::area).sum()
    }

    fn leaves(&self, occupied: bool) -> Vec<Rect> {
        let mut output = Vec::new();

        self.root.visit_leaves_and_branches(&mut |node| {
            if node.children.is_none() && node.occupied == occupied {
                output.push(node.rect);
            }
        });

        output
    }
}

impl Node {
    fn new(rect: Rect) -> Self {
        Self {
            rect,
            occupied: false,
            children: None,
        }
    }

    fn insert(&mut self, size: Size) -> Option<Rect> {
        if let Some(children) = &mut self.children {
            let [left, right] = &mut **children;
            return left.insert(size).or_else(|| right.insert(size));
        }

        if self.occupied || !size.fits_in(&self.rect) {
            return None;
        }

        if size.same_size_as(&self.rect) {
            self.occupied = true;
            return Some(self.rect);
        }

        let [left, right] = split(self.rect, size);
        let children = self
            .children
            .get_or_insert_with(|| Box::new([Node::new(left), Node::new(right)]));

        // The left child is at least as large as the request, but it may
        // still need another split before it matches exactly.
        children[0].insert(size)
    }

    fn visit_leaves_and_branches(&self, visitor: &mut dyn FnMut(&Node)) {
        visitor(self);

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.visit_leaves_and_branches(visitor);
            }
        }
    }
}

/// Cuts `region` in two along the axis with more leftover space. The first
/// rectangle returned is the one the item should go into.
fn split(region: Rect, size: Size) -> [Rect; 2] {
    let width_diff = region.w - size.w;
    let height_diff = region.h - size.h;

    if width_diff > height_diff {
        // Side by side, with the item on the left.
        [
            Rect::new(region.x, region.y, size.w, region.h),
            Rect::new(region.x + size.w, region.y, width_diff, region.h),
        ]
    } else {
        // Stacked, with the item on top.
        [
            Rect::new(region.x, region.y, region.w, size.h),
            Rect::new(region.x, region.y + size.h, region.w, height_diff),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsertError {
    #[error("cannot place an item of size {}x{}, items must have a non-zero width and height", size.w, size.h)]
    InvalidSize { size: Size },

    #[error("no space left for an item of size {}x{}", size.w, size.h)]
    NoSpace { size: Size },
}
