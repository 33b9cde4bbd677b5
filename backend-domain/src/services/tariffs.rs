// Fixed point tariffs of the marketplace

/// Charged to a tourist picking an item up.
pub const PICKUP_COST: i64 = 5;
/// Credited to the tourist who returns an item to a business.
pub const DROPOFF_REWARD: i64 = 10;
/// Credited to the donor once a business confirms a donation.
pub const DONATION_REWARD: i64 = 20;
/// Credited to each of the scanning retailer and the origin business.
pub const SCAN_REWARD: i64 = 1;

/// Smallest balance a debit may leave behind.
pub const BALANCE_FLOOR: i64 = 0;
