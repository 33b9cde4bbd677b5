use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::info;

use backend_domain::ports::{
    AccountField, AccountRepository, ItemRepository, StoreHealth, TransactionRepository,
};
use backend_domain::{
    Account, AccountIdentity, AccountKind, DeltaOutcome, Item, ItemOrigin, ItemPatch,
    ItemStatus, ItemTransition, Transaction, TransactionType, TransitionOutcome,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        kind TEXT NOT NULL,
        key TEXT NOT NULL,
        uid TEXT,
        email TEXT,
        name TEXT NOT NULL,
        points BIGINT NOT NULL DEFAULT 0,
        address TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (kind, key)
    )",
    "CREATE INDEX IF NOT EXISTS accounts_uid_idx ON accounts (kind, uid)",
    "CREATE INDEX IF NOT EXISTS accounts_email_idx ON accounts (kind, email)",
    "CREATE TABLE IF NOT EXISTS items (
        qr_code_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        image_url TEXT,
        status TEXT NOT NULL,
        owner TEXT NOT NULL,
        origin TEXT NOT NULL,
        donor TEXT,
        origin_business TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS transactions (
        seq BIGSERIAL,
        id TEXT PRIMARY KEY,
        business_key TEXT NOT NULL,
        business_name TEXT NOT NULL,
        name TEXT,
        item_name TEXT NOT NULL,
        qr_code_id TEXT,
        transaction_type TEXT NOT NULL,
        date TEXT,
        time TEXT,
        scheduled_at TIMESTAMP,
        created_at TIMESTAMPTZ NOT NULL,
        created_by TEXT
    )",
    "CREATE INDEX IF NOT EXISTS transactions_business_idx ON transactions (business_key, seq)",
];

const ACCOUNT_COLUMNS: &str = "kind, key, uid, email, name, points, address, created_at";
const ITEM_COLUMNS: &str = "qr_code_id, name, description, image_url, status, owner, origin, \
donor, origin_business, created_at, updated_at";
const TRANSACTION_COLUMNS: &str = "id, business_key, business_name, name, item_name, qr_code_id, \
transaction_type, date, time, scheduled_at, created_at, created_by";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connecting to postgres")?;
        Ok(Self { pool })
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("ensuring schema")?;
        }
        info!("postgres schema ready");
        Ok(())
    }
}

/// SQLSTATE 22003, raised when `points + delta` leaves the BIGINT range.
fn is_numeric_out_of_range(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "22003")
}

#[derive(FromRow)]
struct AccountRow {
    kind: String,
    key: String,
    uid: Option<String>,
    email: Option<String>,
    name: String,
    points: i64,
    address: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = anyhow::Error;

    fn try_from(row: AccountRow) -> Result<Self> {
        let kind = AccountKind::parse(&row.kind)
            .ok_or_else(|| anyhow!("unknown account kind '{}'", row.kind))?;
        Ok(Account {
            kind,
            identity: AccountIdentity::new(row.key, row.uid, row.email),
            name: row.name,
            points: row.points,
            address: row.address,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ItemRow {
    qr_code_id: String,
    name: String,
    description: String,
    image_url: Option<String>,
    status: String,
    owner: String,
    origin: String,
    donor: Option<String>,
    origin_business: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = anyhow::Error;

    fn try_from(row: ItemRow) -> Result<Self> {
        let status = ItemStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("item '{}' has invalid status '{}'", row.qr_code_id, row.status))?;
        let origin = ItemOrigin::parse(&row.origin)
            .ok_or_else(|| anyhow!("item '{}' has invalid origin '{}'", row.qr_code_id, row.origin))?;
        Ok(Item {
            qr_code_id: row.qr_code_id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            status,
            owner: row.owner,
            origin,
            donor: row.donor,
            origin_business: row.origin_business,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TransactionRow {
    id: String,
    business_key: String,
    business_name: String,
    name: Option<String>,
    item_name: String,
    qr_code_id: Option<String>,
    transaction_type: String,
    date: Option<String>,
    time: Option<String>,
    scheduled_at: Option<NaiveDateTime>,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = anyhow::Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let transaction_type = TransactionType::normalize(&row.transaction_type)
            .map_err(|err| anyhow!("transaction '{}': {}", row.id, err))?;
        Ok(Transaction {
            id: row.id,
            business_key: row.business_key,
            business_name: row.business_name,
            name: row.name,
            item_name: row.item_name,
            qr_code_id: row.qr_code_id,
            transaction_type,
            date: row.date,
            time: row.time,
            scheduled_at: row.scheduled_at,
            created_at: row.created_at,
            created_by: row.created_by,
        })
    }
}

#[async_trait]
impl AccountRepository for PostgresStore {
    async fn get_account(&self, kind: AccountKind, key: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE kind = $1 AND key = $2"
        ))
        .bind(kind.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    async fn find_account_by(
        &self,
        kind: AccountKind,
        field: AccountField,
        value: &str,
    ) -> Result<Option<Account>> {
        // field names come from a closed enum, never from input
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE kind = $1 AND {} = $2 LIMIT 1",
            field.as_str()
        ))
        .bind(kind.as_str())
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Account::try_from).transpose()
    }

    async fn list_accounts(&self, kind: AccountKind) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE kind = $1 ORDER BY created_at"
        ))
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Account::try_from).collect()
    }

    async fn insert_account(&self, account: &Account) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO accounts (kind, key, uid, email, name, points, address, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (kind, key) DO NOTHING",
        )
        .bind(account.kind.as_str())
        .bind(&account.identity.key)
        .bind(&account.identity.uid)
        .bind(&account.identity.email)
        .bind(&account.name)
        .bind(account.points)
        .bind(&account.address)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn apply_delta(
        &self,
        kind: AccountKind,
        key: &str,
        delta: i64,
        floor: Option<i64>,
    ) -> Result<DeltaOutcome> {
        let updated = sqlx::query_as::<_, (i64,)>(
            "UPDATE accounts SET points = points + $3
             WHERE kind = $1 AND key = $2 AND ($4::BIGINT IS NULL OR points + $3 >= $4)
             RETURNING points",
        )
        .bind(kind.as_str())
        .bind(key)
        .bind(delta)
        .bind(floor)
        .fetch_optional(&self.pool)
        .await;
        let overflowed = match updated {
            Ok(Some((balance,))) => return Ok(DeltaOutcome::Applied { balance }),
            Ok(None) => false,
            Err(err) if is_numeric_out_of_range(&err) => true,
            Err(err) => return Err(err.into()),
        };
        let current: Option<(i64,)> =
            sqlx::query_as("SELECT points FROM accounts WHERE kind = $1 AND key = $2")
                .bind(kind.as_str())
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(match current {
            Some((balance,)) if overflowed => DeltaOutcome::Overflow { balance },
            Some((balance,)) => DeltaOutcome::Insufficient { balance },
            None => DeltaOutcome::NotFound,
        })
    }

    async fn delete_account(&self, kind: AccountKind, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE kind = $1 AND key = $2")
            .bind(kind.as_str())
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ItemRepository for PostgresStore {
    async fn get_item(&self, qr_code_id: &str) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE qr_code_id = $1"
        ))
        .bind(qr_code_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Item::try_from).transpose()
    }

    async fn list_items(&self) -> Result<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!("SELECT {ITEM_COLUMNS} FROM items"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn insert_item(&self, item: &Item) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO items (qr_code_id, name, description, image_url, status, owner, origin,
                donor, origin_business, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             ON CONFLICT (qr_code_id) DO NOTHING",
        )
        .bind(&item.qr_code_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(item.status.as_str())
        .bind(&item.owner)
        .bind(item.origin.as_str())
        .bind(&item.donor)
        .bind(&item.origin_business)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn transition_item(
        &self,
        qr_code_id: &str,
        transition: &ItemTransition,
    ) -> Result<TransitionOutcome> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE items SET owner = $2, status = $3,
                donor = CASE WHEN $4 THEN NULL ELSE donor END,
                updated_at = $5
             WHERE qr_code_id = $1 AND status = $6
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(qr_code_id)
        .bind(&transition.owner)
        .bind(transition.status.as_str())
        .bind(transition.clear_donor)
        .bind(Utc::now())
        .bind(transition.expected.as_str())
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return Ok(TransitionOutcome::Applied(Item::try_from(row)?));
        }
        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM items WHERE qr_code_id = $1")
                .bind(qr_code_id)
                .fetch_optional(&self.pool)
                .await?;
        match current {
            Some((status,)) => {
                let actual = ItemStatus::parse(&status)
                    .ok_or_else(|| anyhow!("item '{}' has invalid status '{}'", qr_code_id, status))?;
                Ok(TransitionOutcome::StatusMismatch { actual })
            }
            None => Ok(TransitionOutcome::NotFound),
        }
    }

    async fn update_item(&self, qr_code_id: &str, patch: &ItemPatch) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE items SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                owner = COALESCE($4, owner),
                image_url = COALESCE($5, image_url),
                updated_at = $6
             WHERE qr_code_id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(qr_code_id)
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(&patch.owner)
        .bind(&patch.image_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Item::try_from).transpose()
    }

    async fn delete_item(&self, qr_code_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE qr_code_id = $1")
            .bind(qr_code_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TransactionRepository for PostgresStore {
    async fn append_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            "INSERT INTO transactions (id, business_key, business_name, name, item_name,
                qr_code_id, transaction_type, date, time, scheduled_at, created_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&transaction.id)
        .bind(&transaction.business_key)
        .bind(&transaction.business_name)
        .bind(&transaction.name)
        .bind(&transaction.item_name)
        .bind(&transaction.qr_code_id)
        .bind(transaction.transaction_type.as_str())
        .bind(&transaction.date)
        .bind(&transaction.time)
        .bind(transaction.scheduled_at)
        .bind(transaction.created_at)
        .bind(&transaction.created_by)
        .execute(&self.pool)
        .await
        .context("appending transaction")?;
        Ok(())
    }

    async fn list_transactions(&self, business_key: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE business_key = $1 ORDER BY seq"
        ))
        .bind(business_key)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn delete_transaction(&self, business_key: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE business_key = $1 AND id = $2")
            .bind(business_key)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StoreHealth for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
