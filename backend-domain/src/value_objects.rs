// Domain value objects
pub mod account_kind;
pub mod identifiers;
pub mod item_status;
pub mod transaction_type;

pub use account_kind::*;
pub use identifiers::*;
pub use item_status::*;
pub use transaction_type::*;
