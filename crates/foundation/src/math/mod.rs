pub mod fit;
pub mod precision;
pub mod vec;

pub use fit::*;
pub use precision::*;
pub use vec::*;
