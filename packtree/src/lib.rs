//! Packtree is a small library for packing rectangles into a single surface,
//! like the images that make up a texture atlas.
//!
//! The core is [`PackingTree`][PackingTree], a binary tree of regions that
//! hands out space one item at a time using guillotine splits. On top of it,
//! [`AtlasPacker`][AtlasPacker] handles a whole run: ordering items, choosing
//! an initial region, padding, and trimming the result.
//!
//! ## Example
//! ```
//! use packtree::{AtlasPacker, InputItem};
//!
//! // First, transform the rectangles you want to pack into the Packtree
//! // InputItem type, keyed however your application likes.
//! let my_items = vec![
//!     InputItem::new("hero.png", (128, 64)),
//!     InputItem::new("coin.png", (64, 64)),
//!     InputItem::new("rope.png", (1, 300)),
//! ];
//!
//! // Construct a packer and configure it with your constraints.
//! let packer = AtlasPacker::new().padding(1).max_size((1024, 1024));
//!
//! // Compute a solution.
//! let output = packer.pack(my_items).unwrap();
//! assert_eq!(output.items().len(), 3);
//! ```
//!
//! The tree can also be driven directly:
//! ```
//! use packtree::{PackingTree, Rect, Size};
//!
//! let mut tree = PackingTree::new(Rect::new(0, 0, 50, 50));
//!
//! assert_eq!(tree.insert(Size::new(50, 20)), Ok(Rect::new(0, 0, 50, 20)));
//! assert_eq!(tree.insert(Size::new(30, 30)), Ok(Rect::new(0, 20, 30, 30)));
//! ```
//!
//! [PackingTree]: struct.PackingTree.html
//! [AtlasPacker]: struct.AtlasPacker.html

mod geometry;
mod packer;
mod tree;
mod types;

pub use geometry::*;
pub use packer::*;
pub use tree::*;
pub use types::*;
