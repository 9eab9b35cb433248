//! Request and response models for the API.
//!
//! All models use serde for serialization/deserialization.
//! Storage models represent key-value records and the campaign document.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Address
// ============================================================================

/// Blockchain account address, always held in lowercase.
///
/// Construction normalizes, so `==` and hashing are case-insensitive with
/// respect to the original input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Address(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Address::new(raw)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Auth Models
// ============================================================================

/// Body of `POST /auth`.
///
/// Fields are optional so a missing field is reported as 400 rather than a
/// deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct AuthRequest {
    pub address: Option<String>,
    pub message: Option<String>,
    pub signature: Option<String>,
}

/// Response after successful authentication.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub address: String,
}

// ============================================================================
// Campaign Models
// ============================================================================

/// Campaign status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            _ => Err(format!(
                "Invalid status '{}': must be one of active, paused, completed",
                s
            )),
        }
    }
}

/// A validated campaign record, as stored in the campaign document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub token_address: Address,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: CampaignStatus,
}

/// Candidate campaign as submitted by a caller (create or update body).
///
/// Every field is optional: creates require all of them, updates may send
/// a subset. `total_amount` accepts either a JSON number or a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignInput {
    pub id: Option<String>,
    pub token_address: Option<String>,
    pub total_amount: Option<AmountInput>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    pub fn as_text(&self) -> String {
        match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) => s.trim().to_string(),
        }
    }
}

/// Whole-document layout of the campaign collection in blob storage.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CampaignDocument {
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<Campaign>,
}

#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub campaign: Campaign,
}

#[derive(Debug, Serialize)]
pub struct CampaignMutationResponse {
    pub campaign: Campaign,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Storage Models
// ============================================================================

/// Session token record as stored in the key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub address: Address,
    pub issued_at: i64,
}

/// Consumed-signature marker as stored in the key-value store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredNonce {
    pub nonce: String,
    pub address: Address,
    pub timestamp: i64,
}
