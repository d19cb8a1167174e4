pub mod detector;
pub mod event_bus;
pub mod guard;
pub mod metrics;
pub mod timer;

pub use detector::*;
pub use event_bus::*;
pub use guard::*;
pub use timer::*;
