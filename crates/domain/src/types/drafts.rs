//! Locally persisted draft documents and chat records.
//!
//! Drafts are owned by a single browser profile, created on "save draft",
//! mutated on edit, and deleted on submit or discard. The sync status field
//! tracks whether a record has been persisted to the remote system.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::BooksError;

/// Kind of financial document a draft holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    Invoice,
    Quotation,
    CreditNote,
    DebitNote,
}

impl DraftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftKind::Invoice => "invoice",
            DraftKind::Quotation => "quotation",
            DraftKind::CreditNote => "credit_note",
            DraftKind::DebitNote => "debit_note",
        }
    }
}

impl FromStr for DraftKind {
    type Err = BooksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(DraftKind::Invoice),
            "quotation" => Ok(DraftKind::Quotation),
            "credit_note" => Ok(DraftKind::CreditNote),
            "debit_note" => Ok(DraftKind::DebitNote),
            other => Err(BooksError::InvalidInput(format!("unknown draft kind: {other}"))),
        }
    }
}

impl fmt::Display for DraftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-record synchronization status.
///
/// Legal transitions: `Local -> Syncing -> Synced`. A record regresses from
/// `Synced` to `Local` only through an explicit local edit (re-dirtying).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Local,
    Syncing,
    Synced,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Local => "local",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
        }
    }

    /// Whether a transition to `next` is a legal sync-state edge.
    ///
    /// Re-dirtying (`Synced -> Local`) is legal because it models an explicit
    /// local edit after a successful sync.
    pub fn can_transition_to(&self, next: SyncStatus) -> bool {
        matches!(
            (self, next),
            (SyncStatus::Local, SyncStatus::Syncing)
                | (SyncStatus::Syncing, SyncStatus::Synced)
                | (SyncStatus::Syncing, SyncStatus::Local)
                | (SyncStatus::Synced, SyncStatus::Local)
        )
    }
}

impl FromStr for SyncStatus {
    type Err = BooksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(SyncStatus::Local),
            "syncing" => Ok(SyncStatus::Syncing),
            "synced" => Ok(SyncStatus::Synced),
            other => Err(BooksError::InvalidInput(format!("unknown sync status: {other}"))),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A locally persisted, not-yet-submitted financial document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftDocument {
    pub id: String,
    pub owner_id: String,
    pub kind: DraftKind,
    /// Lifecycle status ("draft" until submitted or discarded).
    pub status: String,
    pub sync_status: SyncStatus,
    /// Embedded form-field payload, opaque to the store.
    pub payload: serde_json::Value,
    /// Creation time (unix seconds).
    pub created_at: i64,
    /// Last modification time (unix seconds).
    pub updated_at: i64,
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl FromStr for MessageRole {
    type Err = BooksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(BooksError::InvalidInput(format!("unknown message role: {other}"))),
        }
    }
}

/// A locally persisted agent conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatThread {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: i64,
    /// Bumped whenever a message is appended; threads list most-recent-first.
    pub updated_at: i64,
}

/// A single message within a chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub body: String,
    pub created_at: i64,
}

/// An uploaded image kept in the local vault collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: String,
    pub owner_id: String,
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes_base64")]
    pub data: Vec<u8>,
    pub created_at: i64,
}

/// Base64 (de)serialization for image payloads so stored images remain
/// JSON-representable in command responses.
mod serde_bytes_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}
