//! Domain records: identities, profiles and bank details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{BankPanelError, Result};

// ── Roles & statuses ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BankPanelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(BankPanelError::validation(format!("Unknown role: {other}"))),
        }
    }
}

/// Activity flag shared by profiles and bank details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        }
    }

    /// Badge text shown next to a record.
    pub fn label(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = BankPanelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            other => Err(BankPanelError::validation(format!("Unknown status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Merchant {
    GooglePay,
    BharatPe,
    PineLab,
    Axis,
}

impl Merchant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Merchant::GooglePay => "googlepay",
            Merchant::BharatPe => "bharatpe",
            Merchant::PineLab => "pinelab",
            Merchant::Axis => "axis",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Merchant::GooglePay => "Google Pay",
            Merchant::BharatPe => "BharatPe",
            Merchant::PineLab => "Pine Labs",
            Merchant::Axis => "Axis",
        }
    }
}

impl FromStr for Merchant {
    type Err = BankPanelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "googlepay" => Ok(Merchant::GooglePay),
            "bharatpe" => Ok(Merchant::BharatPe),
            "pinelab" => Ok(Merchant::PineLab),
            "axis" => Ok(Merchant::Axis),
            other => Err(BankPanelError::validation(format!("Unknown merchant: {other}"))),
        }
    }
}

// ── Money ────────────────────────────────────

/// Non-negative currency amount held in minor units (hundredths).
///
/// On the wire it is a plain JSON number in major units, e.g. `1250.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    /// Largest amount a signed 64-bit store column can hold.
    pub const MAX: Amount = Amount(i64::MAX as u64);

    pub fn from_minor(minor: u64) -> Self {
        Amount(minor)
    }

    /// Parse a major-unit value, rounding to two decimals.
    pub fn from_major(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(BankPanelError::validation("Freeze balance must be a finite number"));
        }
        if value < 0.0 {
            return Err(BankPanelError::validation("Freeze balance cannot be negative"));
        }
        let minor = (value * 100.0).round();
        if minor >= i64::MAX as f64 {
            return Err(BankPanelError::validation("Freeze balance is too large"));
        }
        Ok(Amount(minor as u64))
    }

    pub fn minor(&self) -> u64 {
        self.0
    }

    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::from_major(value).map_err(serde::de::Error::custom)
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

// ── Identities ────────────────────────────────────

/// Metadata attached to an identity at creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Credentialed identity as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Request to create an identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    /// Skip the verification email and mark the address confirmed.
    pub email_confirm: bool,
    pub user_metadata: UserMetadata,
}

// ── Profiles ────────────────────────────────────

/// Application-level user record linked to an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub user_id: String,
    pub full_name: String,
    pub role: Role,
    pub status: AccountStatus,
}

// ── Bank details ────────────────────────────────────

/// A staff-owned bank or merchant account entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankDetail {
    pub id: String,
    pub staff_id: String,
    pub ac_holder_name: String,
    pub bank_name: String,
    pub acc_number: String,
    pub mobile_number: String,
    pub merchant_name: Merchant,
    pub status: AccountStatus,
    #[serde(default)]
    pub freeze_reason: Option<String>,
    pub freeze_balance: Amount,
    pub created_at: DateTime<Utc>,
    /// Owner profile, embedded on admin listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Profile>,
}

/// Editable bank detail fields as submitted by a form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BankDetailInput {
    #[serde(default)]
    pub ac_holder_name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub acc_number: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub merchant_name: Option<Merchant>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub freeze_reason: Option<String>,
    #[serde(default)]
    pub freeze_balance: Amount,
}

/// Validated bank detail fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankDetailFields {
    pub ac_holder_name: String,
    pub bank_name: String,
    pub acc_number: String,
    pub mobile_number: String,
    pub merchant_name: Merchant,
    pub status: AccountStatus,
    pub freeze_reason: Option<String>,
    pub freeze_balance: Amount,
}

impl BankDetailInput {
    /// Trim and check the submitted fields.
    ///
    /// A freeze reason only survives on inactive accounts.
    pub fn validate(self) -> Result<BankDetailFields> {
        let required = [
            ("Account holder name", &self.ac_holder_name),
            ("Bank name", &self.bank_name),
            ("Account number", &self.acc_number),
            ("Mobile number", &self.mobile_number),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(BankPanelError::validation(format!("{label} is required")));
            }
        }

        let merchant_name = self
            .merchant_name
            .ok_or_else(|| BankPanelError::validation("Merchant is required"))?;

        let freeze_reason = match self.status {
            AccountStatus::Active => None,
            AccountStatus::Inactive => self
                .freeze_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
        };

        Ok(BankDetailFields {
            ac_holder_name: self.ac_holder_name.trim().to_string(),
            bank_name: self.bank_name.trim().to_string(),
            acc_number: self.acc_number.trim().to_string(),
            mobile_number: self.mobile_number.trim().to_string(),
            merchant_name,
            status: self.status,
            freeze_reason,
            freeze_balance: self.freeze_balance,
        })
    }
}

/// Which owner's bank details to list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StaffFilter {
    #[default]
    All,
    Only(String),
}

impl StaffFilter {
    /// `None`, empty and `"all"` select every owner.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") | Some("all") => StaffFilter::All,
            Some(id) => StaffFilter::Only(id.to_string()),
        }
    }

    pub fn staff_id(&self) -> Option<&str> {
        match self {
            StaffFilter::All => None,
            StaffFilter::Only(id) => Some(id),
        }
    }
}
