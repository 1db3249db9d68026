//! Common types shared by the floodsar explorer service.

pub mod dateid;
pub mod error;
pub mod plot;

pub use dateid::DateId;
pub use error::{ExplorerError, ExplorerResult};
pub use plot::{ImageAvailable, KmeansOutput, PlotImageName, PlotJob};
