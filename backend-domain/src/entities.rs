// Domain entities
pub mod account;
pub mod api;
pub mod config;
pub mod geo;
pub mod item;
pub mod side_effect;
pub mod transaction;

pub use account::*;
pub use api::*;
pub use config::*;
pub use geo::*;
pub use item::*;
pub use side_effect::*;
pub use transaction::*;
