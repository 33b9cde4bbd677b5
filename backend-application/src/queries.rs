pub mod account_queries;
pub mod item_queries;
pub mod profile_queries;
pub mod transaction_queries;
