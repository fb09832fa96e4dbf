mod config;
mod sheet;

pub use config::*;
pub use sheet::*;
