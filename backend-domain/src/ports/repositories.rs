use async_trait::async_trait;

use crate::entities::{Account, DeltaOutcome, Item, ItemPatch, ItemTransition, Transaction, TransitionOutcome};
use crate::value_objects::AccountKind;

/// Attribute used for field-equality account lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Uid,
    Email,
}

impl AccountField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountField::Uid => "uid",
            AccountField::Email => "email",
        }
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn get_account(&self, kind: AccountKind, key: &str) -> anyhow::Result<Option<Account>>;
    async fn find_account_by(
        &self,
        kind: AccountKind,
        field: AccountField,
        value: &str,
    ) -> anyhow::Result<Option<Account>>;
    async fn list_accounts(&self, kind: AccountKind) -> anyhow::Result<Vec<Account>>;
    /// Returns `false` when an account with the same key already exists.
    async fn insert_account(&self, account: &Account) -> anyhow::Result<bool>;
    /// Atomically adds `delta`, refusing when the result would drop below `floor`.
    async fn apply_delta(
        &self,
        kind: AccountKind,
        key: &str,
        delta: i64,
        floor: Option<i64>,
    ) -> anyhow::Result<DeltaOutcome>;
    async fn delete_account(&self, kind: AccountKind, key: &str) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn get_item(&self, qr_code_id: &str) -> anyhow::Result<Option<Item>>;
    async fn list_items(&self) -> anyhow::Result<Vec<Item>>;
    /// Returns `false` when the QR code id is already taken.
    async fn insert_item(&self, item: &Item) -> anyhow::Result<bool>;
    /// Compare-and-swap on the current status.
    async fn transition_item(
        &self,
        qr_code_id: &str,
        transition: &ItemTransition,
    ) -> anyhow::Result<TransitionOutcome>;
    async fn update_item(&self, qr_code_id: &str, patch: &ItemPatch) -> anyhow::Result<Option<Item>>;
    async fn delete_item(&self, qr_code_id: &str) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn append_transaction(&self, transaction: &Transaction) -> anyhow::Result<()>;
    /// Unordered; callers sort.
    async fn list_transactions(&self, business_key: &str) -> anyhow::Result<Vec<Transaction>>;
    async fn delete_transaction(&self, business_key: &str, id: &str) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;
}
