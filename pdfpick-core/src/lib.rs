//! Text selection, link hit-testing and coordinate mapping for a paged
//! document view. Rendering, clipboard and process launch stay with the host;
//! document access goes through [`DocumentEngine`].

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod links;
pub mod mapper;
pub mod pointer;
pub mod selection;

#[cfg(test)]
mod testing;

pub use config::{CursorMode, ViewerConfig, ZoomConfig};
pub use engine::{DocumentEngine, TextSpan, Tolerance, WordSpan};
pub use error::{ConfigError, HostError, InteractionError};
pub use geometry::{
    DocumentPoint, DocumentRect, PagePoint, PageSize, PixelPoint, PixelRect, PixelSize,
};
pub use interaction::{
    CursorShape, InteractionMode, Key, Modifiers, PointerInput, SelectionController, ViewerHost,
};
pub use layout::{DisplayMode, PageLayout, ZoomMode, ZoomState};
pub use links::{hit_test, Link, LinkClickEvent};
pub use mapper::{CoordinateMapper, Rotation};
pub use pointer::{PointerCache, PointerState};
pub use selection::{Granularity, SelectionRange, TextPosition};
