mod pack;
mod unpack;

pub use pack::*;
pub use unpack::*;
