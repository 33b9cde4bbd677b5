//! Process-local store used for development and tests.
//!
//! Every conditional write runs under a single write guard, which gives the
//! same atomicity the Postgres store gets from `UPDATE ... WHERE`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use backend_domain::ports::{
    AccountField, AccountRepository, ItemRepository, StoreHealth, TransactionRepository,
};
use backend_domain::{
    Account, AccountKind, DeltaOutcome, Item, ItemPatch, ItemTransition, Transaction,
    TransitionOutcome,
};

#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<AccountKind, Vec<Account>>>,
    items: RwLock<HashMap<String, Item>>,
    // insertion order per business key
    transactions: RwLock<HashMap<String, Vec<Transaction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn get_account(&self, kind: AccountKind, key: &str) -> anyhow::Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(&kind)
            .and_then(|rows| rows.iter().find(|account| account.key() == key))
            .cloned())
    }

    async fn find_account_by(
        &self,
        kind: AccountKind,
        field: AccountField,
        value: &str,
    ) -> anyhow::Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(&kind)
            .and_then(|rows| {
                rows.iter().find(|account| {
                    let stored = match field {
                        AccountField::Uid => account.identity.uid.as_deref(),
                        AccountField::Email => account.identity.email.as_deref(),
                    };
                    stored == Some(value)
                })
            })
            .cloned())
    }

    async fn list_accounts(&self, kind: AccountKind) -> anyhow::Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&kind).cloned().unwrap_or_default())
    }

    async fn insert_account(&self, account: &Account) -> anyhow::Result<bool> {
        let mut accounts = self.accounts.write().await;
        let rows = accounts.entry(account.kind).or_default();
        if rows.iter().any(|existing| existing.key() == account.key()) {
            return Ok(false);
        }
        rows.push(account.clone());
        Ok(true)
    }

    async fn apply_delta(
        &self,
        kind: AccountKind,
        key: &str,
        delta: i64,
        floor: Option<i64>,
    ) -> anyhow::Result<DeltaOutcome> {
        let mut accounts = self.accounts.write().await;
        let Some(account) = accounts
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|account| account.key() == key))
        else {
            return Ok(DeltaOutcome::NotFound);
        };
        let Some(next) = account.points.checked_add(delta) else {
            return Ok(DeltaOutcome::Overflow {
                balance: account.points,
            });
        };
        if let Some(floor) = floor {
            if next < floor {
                return Ok(DeltaOutcome::Insufficient {
                    balance: account.points,
                });
            }
        }
        account.points = next;
        Ok(DeltaOutcome::Applied { balance: next })
    }

    async fn delete_account(&self, kind: AccountKind, key: &str) -> anyhow::Result<bool> {
        let mut accounts = self.accounts.write().await;
        let Some(rows) = accounts.get_mut(&kind) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|account| account.key() != key);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn get_item(&self, qr_code_id: &str) -> anyhow::Result<Option<Item>> {
        Ok(self.items.read().await.get(qr_code_id).cloned())
    }

    async fn list_items(&self) -> anyhow::Result<Vec<Item>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn insert_item(&self, item: &Item) -> anyhow::Result<bool> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.qr_code_id) {
            return Ok(false);
        }
        items.insert(item.qr_code_id.clone(), item.clone());
        Ok(true)
    }

    async fn transition_item(
        &self,
        qr_code_id: &str,
        transition: &ItemTransition,
    ) -> anyhow::Result<TransitionOutcome> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(qr_code_id) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if item.status != transition.expected {
            return Ok(TransitionOutcome::StatusMismatch {
                actual: item.status,
            });
        }
        transition.apply_to(item, Utc::now());
        Ok(TransitionOutcome::Applied(item.clone()))
    }

    async fn update_item(&self, qr_code_id: &str, patch: &ItemPatch) -> anyhow::Result<Option<Item>> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(qr_code_id) else {
            return Ok(None);
        };
        patch.apply_to(item);
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, qr_code_id: &str) -> anyhow::Result<bool> {
        Ok(self.items.write().await.remove(qr_code_id).is_some())
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn append_transaction(&self, transaction: &Transaction) -> anyhow::Result<()> {
        self.transactions
            .write()
            .await
            .entry(transaction.business_key.clone())
            .or_default()
            .push(transaction.clone());
        Ok(())
    }

    async fn list_transactions(&self, business_key: &str) -> anyhow::Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .await
            .get(business_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_transaction(&self, business_key: &str, id: &str) -> anyhow::Result<bool> {
        let mut transactions = self.transactions.write().await;
        let Some(rows) = transactions.get_mut(business_key) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{AccountIdentity, ItemOrigin, ItemStatus};

    fn tourist(key: &str, points: i64) -> Account {
        Account {
            kind: AccountKind::Tourist,
            identity: AccountIdentity::new(key, Some(key.to_string()), Some(format!("{key}@example.com"))),
            name: key.to_string(),
            points,
            address: None,
            created_at: Utc::now(),
        }
    }

    fn item(qr: &str, status: ItemStatus) -> Item {
        let now = Utc::now();
        Item {
            qr_code_id: qr.to_string(),
            name: "Kayak".to_string(),
            description: "Blue".to_string(),
            image_url: None,
            status,
            owner: "biz".to_string(),
            origin: ItemOrigin::Listing,
            donor: None,
            origin_business: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn floor_rejects_overdraw_without_mutation() {
        let store = MemoryStore::new();
        assert!(store.insert_account(&tourist("t1", 3)).await.expect("insert"));
        let outcome = store
            .apply_delta(AccountKind::Tourist, "t1", -5, Some(0))
            .await
            .expect("delta");
        assert_eq!(outcome, DeltaOutcome::Insufficient { balance: 3 });
        let outcome = store
            .apply_delta(AccountKind::Tourist, "t1", -5, None)
            .await
            .expect("delta");
        assert_eq!(outcome, DeltaOutcome::Applied { balance: -2 });
    }

    #[tokio::test]
    async fn overflowing_delta_leaves_balance_untouched() {
        let store = MemoryStore::new();
        assert!(store.insert_account(&tourist("t1", 10)).await.expect("insert"));
        let outcome = store
            .apply_delta(AccountKind::Tourist, "t1", i64::MAX, None)
            .await
            .expect("delta");
        assert_eq!(outcome, DeltaOutcome::Overflow { balance: 10 });
        let outcome = store
            .apply_delta(AccountKind::Tourist, "t1", 1, None)
            .await
            .expect("delta");
        assert_eq!(outcome, DeltaOutcome::Applied { balance: 11 });
    }

    #[tokio::test]
    async fn duplicate_keys_are_refused() {
        let store = MemoryStore::new();
        assert!(store.insert_account(&tourist("t1", 10)).await.expect("insert"));
        assert!(!store.insert_account(&tourist("t1", 10)).await.expect("insert"));
        assert!(store.insert_item(&item("qr", ItemStatus::Available)).await.expect("insert"));
        assert!(!store.insert_item(&item("qr", ItemStatus::Available)).await.expect("insert"));
    }

    #[tokio::test]
    async fn transition_checks_expected_status() {
        let store = MemoryStore::new();
        store.insert_item(&item("qr", ItemStatus::Unavailable)).await.expect("insert");
        let transition = ItemTransition::new(ItemStatus::Available, "t1", ItemStatus::Unavailable);
        let outcome = store.transition_item("qr", &transition).await.expect("transition");
        assert!(matches!(
            outcome,
            TransitionOutcome::StatusMismatch { actual: ItemStatus::Unavailable }
        ));
        let outcome = store.transition_item("missing", &transition).await.expect("transition");
        assert!(matches!(outcome, TransitionOutcome::NotFound));
    }

    #[tokio::test]
    async fn lookup_by_email_field() {
        let store = MemoryStore::new();
        store.insert_account(&tourist("uid-9", 10)).await.expect("insert");
        let found = store
            .find_account_by(AccountKind::Tourist, AccountField::Email, "uid-9@example.com")
            .await
            .expect("find");
        assert_eq!(found.map(|account| account.identity.key), Some("uid-9".to_string()));
    }
}
