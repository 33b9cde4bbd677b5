// Item entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ItemOrigin, ItemStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub qr_code_id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: ItemStatus,
    /// Identity key of the account currently holding the item.
    pub owner: String,
    pub origin: ItemOrigin,
    /// Donating tourist, set while a donation awaits confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_business: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.owner.is_none()
            && self.image_url.is_none()
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(owner) = &self.owner {
            item.owner = owner.clone();
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = Some(image_url.clone());
        }
    }
}

/// Compare-and-swap request for the item status machine.
#[derive(Debug, Clone)]
pub struct ItemTransition {
    pub expected: ItemStatus,
    pub owner: String,
    pub status: ItemStatus,
    pub clear_donor: bool,
}

impl ItemTransition {
    pub fn new(expected: ItemStatus, owner: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            expected,
            owner: owner.into(),
            status,
            clear_donor: false,
        }
    }

    pub fn clearing_donor(mut self) -> Self {
        self.clear_donor = true;
        self
    }

    pub fn apply_to(&self, item: &mut Item, now: DateTime<Utc>) {
        item.owner = self.owner.clone();
        item.status = self.status;
        if self.clear_donor {
            item.donor = None;
        }
        item.updated_at = now;
    }
}

#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(Item),
    NotFound,
    StatusMismatch { actual: ItemStatus },
}
