//! Audit journal: account receipts
//!
//! The audit journal is the account's accountability record. Every
//! lifecycle transition and every configuration change produces a receipt.

use crate::{AccountId, MemberId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of event a receipt records
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptType {
    AccountCreated,
    IntentCreated,
    IntentApproved,
    IntentRevoked,
    IntentExecuted,
    IntentDeleted,
    RulesChanged,
    DepsChanged,
    MetadataChanged,
    UnverifiedToggled,
    Custom(String),
}

/// A receipt issued by an account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountReceipt {
    /// Unique receipt identifier
    pub receipt_id: String,
    /// The account that issued the receipt
    pub account_id: AccountId,
    /// Type of receipt
    pub receipt_type: ReceiptType,
    /// The member or module that triggered the receipt
    pub actor: MemberId,
    /// Human-readable description
    pub description: String,
    /// When the receipt was created (host clock where one was supplied)
    pub timestamp: DateTime<Utc>,
    /// Additional metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl AccountReceipt {
    pub fn new(
        account_id: AccountId,
        receipt_type: ReceiptType,
        actor: MemberId,
        description: impl Into<String>,
    ) -> Self {
        Self {
            receipt_id: uuid::Uuid::new_v4().to_string(),
            account_id,
            receipt_type,
            actor,
            description: description.into(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The complete audit journal for an account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditJournal {
    pub account_id: AccountId,
    pub receipts: Vec<AccountReceipt>,
}

impl AuditJournal {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            receipts: Vec::new(),
        }
    }

    pub fn log_receipt(&mut self, receipt: AccountReceipt) {
        self.receipts.push(receipt);
    }

    /// Get all receipts triggered by an actor
    pub fn receipts_for_actor(&self, actor: &MemberId) -> Vec<&AccountReceipt> {
        self.receipts.iter().filter(|r| r.actor == *actor).collect()
    }

    /// Get all receipts of one type
    pub fn receipts_of_type(&self, receipt_type: &ReceiptType) -> Vec<&AccountReceipt> {
        self.receipts
            .iter()
            .filter(|r| r.receipt_type == *receipt_type)
            .collect()
    }

    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }
}
