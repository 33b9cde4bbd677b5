pub mod account_handlers;
pub mod item_handlers;
pub mod ops_handlers;
pub mod profile_handlers;
pub mod retailer_handlers;
pub mod transaction_handlers;

pub use account_handlers::*;
pub use item_handlers::*;
pub use ops_handlers::*;
pub use profile_handlers::*;
pub use retailer_handlers::*;
pub use transaction_handlers::*;
