//! Local backend — SQLite schema for identities, profiles and bank details.

use async_trait::async_trait;
use bankpanel_core::error::{BankPanelError, Result};
use bankpanel_core::traits::{DataStore, IdentityAdmin};
use bankpanel_core::types::{
    Amount, BankDetail, BankDetailFields, Identity, NewIdentity, NewProfile, Profile, Role,
    StaffFilter, UserMetadata,
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

const PROFILE_COLS: &str = "id, user_id, full_name, role, status, created_at";
const BANK_COLS: &str = "b.id, b.staff_id, b.ac_holder_name, b.bank_name, b.acc_number, \
    b.mobile_number, b.merchant_name, b.status, b.freeze_reason, b.freeze_balance, b.created_at";
const OWNER_COLS: &str = "p.id, p.user_id, p.full_name, p.role, p.status, p.created_at";
const MIN_PASSWORD_LEN: usize = 6;

/// Embedded backend implementing both the identity and table-store seams.
pub struct LocalBackend {
    conn: Mutex<Connection>,
    hash_cost: u32,
}

impl LocalBackend {
    /// Open or create the database. `:memory:` gives a private in-memory store.
    pub fn open(path: &Path) -> Result<Self> {
        if path != Path::new(":memory:") {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BankPanelError::store(format!("Create {}: {e}", parent.display())))?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| BankPanelError::store(format!("DB open error: {e}")))?;
        let db = Self { conn: Mutex::new(conn), hash_cost: bcrypt::DEFAULT_COST };
        db.migrate()?;
        Ok(db)
    }

    /// bcrypt cost for new password hashes (4..=31).
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| BankPanelError::store("Database lock poisoned"))
    }

    /// Run schema migrations.
    fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch("
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS identities (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                password_hash TEXT NOT NULL,
                email_confirmed INTEGER NOT NULL DEFAULT 0,
                full_name TEXT,
                role TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                user_id TEXT UNIQUE NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
                full_name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'staff' CHECK (role IN ('admin', 'staff')),
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bank_details (
                id TEXT PRIMARY KEY,
                staff_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                ac_holder_name TEXT NOT NULL,
                bank_name TEXT NOT NULL,
                acc_number TEXT NOT NULL,
                mobile_number TEXT NOT NULL,
                merchant_name TEXT NOT NULL
                    CHECK (merchant_name IN ('googlepay', 'bharatpe', 'pinelab', 'axis')),
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
                freeze_reason TEXT,
                freeze_balance INTEGER NOT NULL DEFAULT 0 CHECK (freeze_balance >= 0),
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_bank_details_staff ON bank_details(staff_id);
        ").map_err(|e| BankPanelError::store(format!("Migration error: {e}")))?;
        Ok(())
    }

    /// Install the trigger that creates a profile for every new identity,
    /// taking name and role from the identity metadata.
    pub fn enable_profile_trigger(&self) -> Result<()> {
        self.conn()?.execute_batch("
            CREATE TRIGGER IF NOT EXISTS create_profile_on_signup
            AFTER INSERT ON identities
            BEGIN
                INSERT INTO profiles (id, user_id, full_name, role, status, created_at)
                VALUES (
                    lower(hex(randomblob(16))),
                    NEW.id,
                    COALESCE(NEW.full_name, NEW.email),
                    COALESCE(NEW.role, 'staff'),
                    'active',
                    NEW.created_at
                );
            END;
        ").map_err(|e| BankPanelError::store(format!("Create trigger: {e}")))?;
        Ok(())
    }

    /// Look up an identity by email (case-insensitive).
    pub fn identity_by_email(&self, email: &str) -> Result<Option<Identity>> {
        self.conn()?.query_row(
            "SELECT id, email, full_name, role FROM identities WHERE email=?1",
            params![email],
            identity_from_row,
        ).optional().map_err(|e| BankPanelError::store(format!("Get identity: {e}")))
    }

    pub fn identity_count(&self) -> Result<u32> {
        self.conn()?.query_row("SELECT COUNT(*) FROM identities", [], |r| r.get(0))
            .map_err(|e| BankPanelError::store(format!("Count identities: {e}")))
    }

    fn get_profile_where(&self, column: &str, value: &str) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLS} FROM profiles WHERE {column}=?1");
        self.conn()?.query_row(&sql, params![value], |row| profile_from_row(row, 0))
            .optional()
            .map_err(|e| BankPanelError::store(format!("Get profile: {e}")))
    }

    fn get_detail(&self, id: &str) -> Result<Option<BankDetail>> {
        let sql = format!("SELECT {BANK_COLS} FROM bank_details b WHERE b.id=?1");
        self.conn()?.query_row(&sql, params![id], |row| detail_from_row(row, false))
            .optional()
            .map_err(|e| BankPanelError::store(format!("Get bank detail: {e}")))
    }
}

// ── Row mapping ────────────────────────────────────

fn parse_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = BankPanelError>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: BankPanelError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn identity_from_row(row: &Row<'_>) -> rusqlite::Result<Identity> {
    let role: Option<String> = row.get(3)?;
    Ok(Identity {
        id: row.get(0)?,
        email: row.get(1)?,
        user_metadata: UserMetadata {
            full_name: row.get(2)?,
            role: role.and_then(|r| r.parse().ok()),
        },
    })
}

fn profile_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(base)?,
        user_id: row.get(base + 1)?,
        full_name: row.get(base + 2)?,
        role: parse_col(row, base + 3)?,
        status: parse_col(row, base + 4)?,
        created_at: row.get::<_, DateTime<Utc>>(base + 5)?,
    })
}

fn detail_from_row(row: &Row<'_>, with_owner: bool) -> rusqlite::Result<BankDetail> {
    let balance: i64 = row.get(9)?;
    let profiles = if with_owner && row.get::<_, Option<String>>(11)?.is_some() {
        Some(profile_from_row(row, 11)?)
    } else {
        None
    };
    Ok(BankDetail {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        ac_holder_name: row.get(2)?,
        bank_name: row.get(3)?,
        acc_number: row.get(4)?,
        mobile_number: row.get(5)?,
        merchant_name: parse_col(row, 6)?,
        status: parse_col(row, 7)?,
        freeze_reason: row.get(8)?,
        freeze_balance: Amount::from_minor(balance.max(0) as u64),
        created_at: row.get(10)?,
        profiles,
    })
}

fn balance_col(amount: Amount) -> Result<i64> {
    i64::try_from(amount.minor())
        .map_err(|_| BankPanelError::validation("Freeze balance is too large"))
}

fn is_constraint(e: &rusqlite::Error) -> bool {
    e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
}

// ── Identity seam ────────────────────────────────────

#[async_trait]
impl IdentityAdmin for LocalBackend {
    fn name(&self) -> &str { "local" }

    async fn create_user(&self, user: &NewIdentity) -> Result<Identity> {
        let email = user.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(BankPanelError::identity("Unable to validate email address: invalid format"));
        }
        if user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BankPanelError::identity(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters."
            )));
        }

        let password = user.password.clone();
        let cost = self.hash_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| BankPanelError::identity(format!("Hash task failed: {e}")))?
            .map_err(|e| BankPanelError::identity(format!("Hash error: {e}")))?;

        let id = uuid::Uuid::new_v4().to_string();
        let role = user.user_metadata.role.map(|r| r.as_str());
        self.conn()?.execute(
            "INSERT INTO identities (id, email, password_hash, email_confirmed, full_name, role, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![id, email, password_hash, user.email_confirm, user.user_metadata.full_name, role, Utc::now()],
        ).map_err(|e| {
            if is_constraint(&e) {
                BankPanelError::identity("A user with this email address has already been registered")
            } else {
                BankPanelError::identity(format!("Create user: {e}"))
            }
        })?;

        Ok(Identity { id, email, user_metadata: user.user_metadata.clone() })
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let deleted = self.conn()?.execute("DELETE FROM identities WHERE id=?1", params![user_id])
            .map_err(|e| BankPanelError::identity(format!("Delete user: {e}")))?;
        if deleted == 0 {
            return Err(BankPanelError::not_found("User not found"));
        }
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let row = self.conn()?.query_row(
            "SELECT id, email, full_name, role, password_hash FROM identities WHERE email=?1",
            params![email.trim()],
            |row| Ok((identity_from_row(row)?, row.get::<_, String>(4)?)),
        ).optional().map_err(|e| BankPanelError::store(format!("Get identity: {e}")))?;

        let Some((identity, hash)) = row else {
            return Err(BankPanelError::unauthorized("Invalid login credentials"));
        };
        let password = password.to_string();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false);
        if !valid {
            return Err(BankPanelError::unauthorized("Invalid login credentials"));
        }
        Ok(identity)
    }
}

// ── Table store seam ────────────────────────────────────

#[async_trait]
impl DataStore for LocalBackend {
    async fn insert_profile(&self, profile: &NewProfile) -> Result<Profile> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conn()?.execute(
            "INSERT INTO profiles (id, user_id, full_name, role, status, created_at) VALUES (?1,?2,?3,?4,?5,?6)",
            params![id, profile.user_id, profile.full_name, profile.role.as_str(), profile.status.as_str(), Utc::now()],
        ).map_err(|e| BankPanelError::store(format!("Insert profile: {e}")))?;

        self.get_profile_where("id", &id)?
            .ok_or_else(|| BankPanelError::store("Insert profile: row not returned"))
    }

    async fn profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        self.get_profile_where("user_id", user_id)
    }

    async fn profile_by_id(&self, id: &str) -> Result<Option<Profile>> {
        self.get_profile_where("id", id)
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<Profile>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {PROFILE_COLS} FROM profiles WHERE (?1 IS NULL OR role=?1) ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)
            .map_err(|e| BankPanelError::store(format!("Prepare: {e}")))?;
        let profiles = stmt.query_map(params![role.map(|r| r.as_str())], |row| profile_from_row(row, 0))
            .map_err(|e| BankPanelError::store(format!("Query: {e}")))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| BankPanelError::store(format!("Read profile: {e}")))?;
        Ok(profiles)
    }

    async fn list_bank_details(&self, filter: &StaffFilter, with_owner: bool) -> Result<Vec<BankDetail>> {
        let conn = self.conn()?;
        let sql = if with_owner {
            format!(
                "SELECT {BANK_COLS}, {OWNER_COLS} FROM bank_details b
                 LEFT JOIN profiles p ON p.id = b.staff_id
                 WHERE (?1 IS NULL OR b.staff_id=?1) ORDER BY b.created_at DESC, b.rowid DESC"
            )
        } else {
            format!(
                "SELECT {BANK_COLS} FROM bank_details b
                 WHERE (?1 IS NULL OR b.staff_id=?1) ORDER BY b.created_at DESC, b.rowid DESC"
            )
        };
        let mut stmt = conn.prepare(&sql)
            .map_err(|e| BankPanelError::store(format!("Prepare: {e}")))?;
        let details = stmt.query_map(params![filter.staff_id()], |row| detail_from_row(row, with_owner))
            .map_err(|e| BankPanelError::store(format!("Query: {e}")))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| BankPanelError::store(format!("Read bank detail: {e}")))?;
        Ok(details)
    }

    async fn get_bank_detail(&self, id: &str) -> Result<Option<BankDetail>> {
        self.get_detail(id)
    }

    async fn insert_bank_detail(&self, staff_id: &str, fields: &BankDetailFields) -> Result<BankDetail> {
        let balance = balance_col(fields.freeze_balance)?;
        let id = uuid::Uuid::new_v4().to_string();
        self.conn()?.execute(
            "INSERT INTO bank_details (id, staff_id, ac_holder_name, bank_name, acc_number, mobile_number,
                merchant_name, status, freeze_reason, freeze_balance, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                id, staff_id, fields.ac_holder_name, fields.bank_name, fields.acc_number,
                fields.mobile_number, fields.merchant_name.as_str(), fields.status.as_str(),
                fields.freeze_reason, balance, Utc::now(),
            ],
        ).map_err(|e| BankPanelError::store(format!("Insert bank detail: {e}")))?;

        self.get_detail(&id)?
            .ok_or_else(|| BankPanelError::store("Insert bank detail: row not returned"))
    }

    async fn update_bank_detail(&self, id: &str, fields: &BankDetailFields) -> Result<BankDetail> {
        let balance = balance_col(fields.freeze_balance)?;
        let updated = self.conn()?.execute(
            "UPDATE bank_details SET ac_holder_name=?1, bank_name=?2, acc_number=?3, mobile_number=?4,
                merchant_name=?5, status=?6, freeze_reason=?7, freeze_balance=?8
             WHERE id=?9",
            params![
                fields.ac_holder_name, fields.bank_name, fields.acc_number, fields.mobile_number,
                fields.merchant_name.as_str(), fields.status.as_str(), fields.freeze_reason,
                balance, id,
            ],
        ).map_err(|e| BankPanelError::store(format!("Update bank detail: {e}")))?;
        if updated == 0 {
            return Err(BankPanelError::not_found("Bank detail not found"));
        }
        self.get_detail(id)?
            .ok_or_else(|| BankPanelError::not_found("Bank detail not found"))
    }

    async fn delete_bank_detail(&self, id: &str) -> Result<()> {
        self.conn()?.execute("DELETE FROM bank_details WHERE id=?1", params![id])
            .map_err(|e| BankPanelError::store(format!("Delete bank detail: {e}")))?;
        Ok(())
    }
}
