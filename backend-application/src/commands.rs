pub mod account_commands;
pub mod item_commands;
pub mod transaction_commands;
