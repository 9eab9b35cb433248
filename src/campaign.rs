//! Campaign validation and lifecycle rules.
//!
//! Functions here never touch storage: they take the loaded collection,
//! mutate it in memory, and leave persisting to the caller.
//!
//! Mutability narrows with time. Before `start_date` every field may change;
//! from `start_date` on only `status` may change; a `completed` campaign is
//! frozen. "Today" is the UTC calendar date and is passed in by the caller.

use crate::models::{AmountInput, Address, Campaign, CampaignInput, CampaignStatus};
use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CampaignError {
    #[error("{0}")]
    Validation(String),

    #[error("Campaign '{0}' not found")]
    NotFound(String),

    #[error("Campaign with id '{0}' already exists")]
    DuplicateId(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Campaign '{0}' has already started; only status may change")]
    AlreadyStarted(String),

    #[error("{0}")]
    CannotDelete(String),
}

fn required<'a, T>(value: &'a Option<T>, field: &str) -> Result<&'a T, CampaignError> {
    value
        .as_ref()
        .ok_or_else(|| CampaignError::Validation(format!("Missing required field: {}", field)))
}

fn required_text<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, CampaignError> {
    let text = required(value, field)?.trim();
    if text.is_empty() {
        return Err(CampaignError::Validation(format!(
            "Missing required field: {}",
            field
        )));
    }
    Ok(text)
}

/// Parse a calendar date. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp,
/// whose UTC date is used.
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, CampaignError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_utc().date()))
        .map_err(|_| {
            CampaignError::Validation(format!(
                "Invalid {}: '{}' (expected YYYY-MM-DD)",
                field, raw
            ))
        })
}

/// The value `amount` reads back as after a save and load of the document.
fn float_form(amount: Decimal) -> Option<Decimal> {
    amount
        .to_f64()
        .filter(|f| f.is_finite())
        .and_then(|f| Decimal::from_str(&f.to_string()).ok())
}

/// First value that survives a save and load unchanged.
fn stable_float_form(exact: Decimal) -> Option<Decimal> {
    let mut amount = float_form(exact)?;
    for _ in 0..4 {
        let next = float_form(amount)?;
        if next == amount {
            return Some(amount);
        }
        amount = next;
    }
    None
}

/// Parse a positive amount.
///
/// The document stores amounts as f64, so the value kept is the one that
/// reads back from its f64 form. Amounts with no such form are rejected.
pub fn parse_amount(raw: &AmountInput) -> Result<Decimal, CampaignError> {
    let text = raw.as_text();
    let exact = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| {
            CampaignError::Validation(format!("Invalid total_amount: '{}' is not a number", text))
        })?;

    let amount = stable_float_form(exact).ok_or_else(|| {
        CampaignError::Validation(format!(
            "Invalid total_amount: '{}' cannot be stored as a floating-point amount",
            text
        ))
    })?;

    if amount <= Decimal::ZERO {
        return Err(CampaignError::Validation(format!(
            "Invalid total_amount: must be greater than 0, got {}",
            amount
        )));
    }
    Ok(amount)
}

fn parse_status(raw: &str) -> Result<CampaignStatus, CampaignError> {
    CampaignStatus::from_str(raw.trim()).map_err(CampaignError::Validation)
}

/// Validate a candidate campaign and build the stored record.
pub fn validate(input: &CampaignInput) -> Result<Campaign, CampaignError> {
    let id = required_text(&input.id, "id")?;
    let token_address = required_text(&input.token_address, "token_address")?;
    let total_amount = parse_amount(required(&input.total_amount, "total_amount")?)?;
    let start_date = parse_date(required_text(&input.start_date, "start_date")?, "start_date")?;
    let end_date = parse_date(required_text(&input.end_date, "end_date")?, "end_date")?;

    if end_date <= start_date {
        return Err(CampaignError::Validation(format!(
            "end_date ({}) must be after start_date ({})",
            end_date, start_date
        )));
    }

    let status = match &input.status {
        Some(raw) => parse_status(raw)?,
        None => CampaignStatus::default(),
    };

    Ok(Campaign {
        id: id.to_string(),
        token_address: Address::new(token_address),
        total_amount,
        start_date,
        end_date,
        status,
    })
}

/// Validate `input` and append it, unless its id is already taken.
pub fn create(input: &CampaignInput, campaigns: &mut Vec<Campaign>) -> Result<Campaign, CampaignError> {
    if let Some(id) = input.id.as_deref().map(str::trim) {
        if campaigns.iter().any(|c| c.id == id) {
            return Err(CampaignError::DuplicateId(id.to_string()));
        }
    }

    let campaign = validate(input)?;
    campaigns.push(campaign.clone());
    Ok(campaign)
}

fn has_started(campaign: &Campaign, today: NaiveDate) -> bool {
    campaign.start_date <= today
}

/// Fields other than `status` that were submitted with a value different
/// from the stored record.
fn changed_fields(stored: &Campaign, input: &CampaignInput) -> Vec<&'static str> {
    let mut changed = Vec::new();

    if let Some(raw) = &input.token_address {
        if Address::new(raw) != stored.token_address {
            changed.push("token_address");
        }
    }
    if let Some(raw) = &input.total_amount {
        if parse_amount(raw).ok() != Some(stored.total_amount) {
            changed.push("total_amount");
        }
    }
    if let Some(raw) = &input.start_date {
        if parse_date(raw, "start_date").ok() != Some(stored.start_date) {
            changed.push("start_date");
        }
    }
    if let Some(raw) = &input.end_date {
        if parse_date(raw, "end_date").ok() != Some(stored.end_date) {
            changed.push("end_date");
        }
    }

    changed
}

/// Overlay submitted fields on the stored record, keeping its id.
fn merge(stored: &Campaign, input: &CampaignInput) -> CampaignInput {
    CampaignInput {
        id: Some(stored.id.clone()),
        token_address: input
            .token_address
            .clone()
            .or_else(|| Some(stored.token_address.to_string())),
        total_amount: input
            .total_amount
            .clone()
            .or_else(|| Some(AmountInput::Text(stored.total_amount.to_string()))),
        start_date: input
            .start_date
            .clone()
            .or_else(|| Some(stored.start_date.to_string())),
        end_date: input
            .end_date
            .clone()
            .or_else(|| Some(stored.end_date.to_string())),
        status: input
            .status
            .clone()
            .or_else(|| Some(stored.status.as_str().to_string())),
    }
}

/// Apply an update to the campaign with `id`.
///
/// The id in `input`, if any, is ignored; the stored id is kept.
pub fn update(
    id: &str,
    input: &CampaignInput,
    campaigns: &mut [Campaign],
    today: NaiveDate,
) -> Result<Campaign, CampaignError> {
    let stored = campaigns
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| CampaignError::NotFound(id.to_string()))?;

    if stored.status == CampaignStatus::Completed {
        return Err(CampaignError::InvalidTransition(format!(
            "Campaign '{}' is completed and can no longer be modified",
            id
        )));
    }

    if has_started(stored, today) {
        let changed = changed_fields(stored, input);
        if !changed.is_empty() {
            return Err(CampaignError::InvalidTransition(format!(
                "Campaign '{}' is active; only status may change (attempted to change: {})",
                id,
                changed.join(", ")
            )));
        }
        if let Some(raw) = &input.status {
            stored.status = parse_status(raw)?;
        }
        return Ok(stored.clone());
    }

    // Not started yet. Re-checked here so a full edit can never land on a
    // started campaign even if the branch above changes.
    if has_started(stored, today) {
        return Err(CampaignError::AlreadyStarted(id.to_string()));
    }

    let replacement = validate(&merge(stored, input))?;
    *stored = replacement.clone();
    Ok(replacement)
}

/// Remove the campaign with `id` if it has neither started nor completed.
pub fn delete(id: &str, campaigns: &mut Vec<Campaign>, today: NaiveDate) -> Result<Campaign, CampaignError> {
    let index = campaigns
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| CampaignError::NotFound(id.to_string()))?;

    let campaign = &campaigns[index];
    if campaign.status == CampaignStatus::Completed {
        return Err(CampaignError::CannotDelete(format!(
            "Cannot delete campaign '{}': it is completed",
            id
        )));
    }
    if has_started(campaign, today) {
        return Err(CampaignError::CannotDelete(format!(
            "Cannot delete campaign '{}': it started on {}",
            id, campaign.start_date
        )));
    }

    Ok(campaigns.remove(index))
}
