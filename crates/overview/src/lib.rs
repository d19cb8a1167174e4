//! Bird-view overview of an independently rendered graph surface.
//!
//! The renderer reads whatever the primary surface currently shows, fits it
//! into the overview container, draws the viewport indicator, and wires
//! focusable node clones to the [`FocusDispatcher`].

pub mod config;
pub mod error;
pub mod focus;
pub mod markup;
pub mod renderer;
pub mod surface;
pub mod svg;

pub use config::*;
pub use error::OverviewError;
pub use focus::*;
pub use renderer::*;
pub use surface::*;
