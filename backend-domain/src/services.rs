// Pure domain services
pub mod distance;
pub mod ranking;
pub mod schedule;
pub mod tariffs;

pub use distance::*;
pub use ranking::*;
pub use schedule::*;
pub use tariffs::*;
