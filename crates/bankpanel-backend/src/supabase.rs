//! Hosted backend — auth admin API plus REST tables, authenticated with the
//! service-role key.

use async_trait::async_trait;
use bankpanel_core::error::{BankPanelError, Result};
use bankpanel_core::traits::{DataStore, IdentityAdmin};
use bankpanel_core::types::{
    BankDetail, BankDetailFields, Identity, NewIdentity, NewProfile, Profile, Role, StaffFilter,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::rest::{TableQuery, upstream_message};

const OWNER_EMBED: &str = "*,profiles:staff_id(id,user_id,full_name,role,status,created_at)";

pub struct SupabaseBackend {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl SupabaseBackend {
    pub fn new(url: &str, service_key: &str) -> Result<Self> {
        if url.trim().is_empty() || service_key.trim().is_empty() {
            return Err(BankPanelError::config("Hosted backend needs a URL and a service-role key"));
        }
        Ok(Self {
            base_url: url.trim().trim_end_matches('/').to_string(),
            service_key: service_key.trim().to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    fn table(&self, method: Method, query: &TableQuery) -> RequestBuilder {
        let qs = query.query_string();
        let path = if qs.is_empty() {
            format!("/rest/v1/{}", query.table())
        } else {
            format!("/rest/v1/{}?{qs}", query.table())
        };
        self.request(method, &path)
    }

    /// Send and decode, mapping non-2xx responses through `on_error`.
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        on_error: fn(String) -> BankPanelError,
    ) -> Result<T> {
        let text = self.send_raw(req, on_error).await?;
        serde_json::from_str(&text).map_err(|e| BankPanelError::Http(format!("Invalid JSON: {e}")))
    }

    async fn send_raw(&self, req: RequestBuilder, on_error: fn(String) -> BankPanelError) -> Result<String> {
        let resp = req.send().await.map_err(|e| BankPanelError::Http(format!("Backend request failed: {e}")))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| BankPanelError::Http(format!("Read error: {e}")))?;
        if !status.is_success() {
            let msg = upstream_message(&text).unwrap_or_else(|| format!("Backend {status}: {text}"));
            return Err(on_error(msg));
        }
        Ok(text)
    }

    async fn select_one<T: DeserializeOwned>(&self, query: TableQuery) -> Result<Option<T>> {
        let rows: Vec<T> = self.send(self.table(Method::GET, &query.limit(1)), BankPanelError::Store).await?;
        Ok(rows.into_iter().next())
    }
}

fn parse_identity(json: serde_json::Value) -> Result<Identity> {
    // Admin endpoints return the user object; token grants wrap it in `user`.
    let user = match json.get("user") {
        Some(u) if u.is_object() => u.clone(),
        _ => json,
    };
    serde_json::from_value(user).map_err(|e| BankPanelError::identity(format!("Unexpected user payload: {e}")))
}

#[async_trait]
impl IdentityAdmin for SupabaseBackend {
    fn name(&self) -> &str { "supabase" }

    async fn create_user(&self, user: &NewIdentity) -> Result<Identity> {
        let body = serde_json::json!({
            "email": user.email,
            "password": user.password,
            "email_confirm": user.email_confirm,
            "user_metadata": user.user_metadata,
        });
        let json: serde_json::Value = self
            .send(self.request(Method::POST, "/auth/v1/admin/users").json(&body), BankPanelError::Identity)
            .await?;
        parse_identity(json)
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let path = format!("/auth/v1/admin/users/{}", urlencoding::encode(user_id));
        self.send_raw(self.request(Method::DELETE, &path), BankPanelError::Identity).await?;
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let body = serde_json::json!({ "email": email, "password": password });
        let json: serde_json::Value = self
            .send(
                self.request(Method::POST, "/auth/v1/token?grant_type=password").json(&body),
                BankPanelError::Unauthorized,
            )
            .await?;
        parse_identity(json)
    }
}

#[async_trait]
impl DataStore for SupabaseBackend {
    async fn insert_profile(&self, profile: &NewProfile) -> Result<Profile> {
        let rows: Vec<Profile> = self
            .send(
                self.table(Method::POST, &TableQuery::new("profiles"))
                    .header("Prefer", "return=representation")
                    .json(&[profile]),
                BankPanelError::Store,
            )
            .await?;
        rows.into_iter().next().ok_or_else(|| BankPanelError::store("Insert profile: row not returned"))
    }

    async fn profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        self.select_one(TableQuery::new("profiles").select("*").eq("user_id", user_id)).await
    }

    async fn profile_by_id(&self, id: &str) -> Result<Option<Profile>> {
        self.select_one(TableQuery::new("profiles").select("*").eq("id", id)).await
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<Profile>> {
        let mut query = TableQuery::new("profiles").select("*");
        if let Some(role) = role {
            query = query.eq("role", role.as_str());
        }
        let query = query.order("created_at", false);
        self.send(self.table(Method::GET, &query), BankPanelError::Store).await
    }

    async fn list_bank_details(&self, filter: &StaffFilter, with_owner: bool) -> Result<Vec<BankDetail>> {
        let mut query = TableQuery::new("bank_details").select(if with_owner { OWNER_EMBED } else { "*" });
        if let Some(staff_id) = filter.staff_id() {
            query = query.eq("staff_id", staff_id);
        }
        let query = query.order("created_at", false);
        self.send(self.table(Method::GET, &query), BankPanelError::Store).await
    }

    async fn get_bank_detail(&self, id: &str) -> Result<Option<BankDetail>> {
        self.select_one(TableQuery::new("bank_details").select("*").eq("id", id)).await
    }

    async fn insert_bank_detail(&self, staff_id: &str, fields: &BankDetailFields) -> Result<BankDetail> {
        let mut body = serde_json::to_value(fields)
            .map_err(|e| BankPanelError::store(format!("Encode bank detail: {e}")))?;
        body["staff_id"] = serde_json::Value::String(staff_id.to_string());

        let rows: Vec<BankDetail> = self
            .send(
                self.table(Method::POST, &TableQuery::new("bank_details"))
                    .header("Prefer", "return=representation")
                    .json(&[body]),
                BankPanelError::Store,
            )
            .await?;
        rows.into_iter().next().ok_or_else(|| BankPanelError::store("Insert bank detail: row not returned"))
    }

    async fn update_bank_detail(&self, id: &str, fields: &BankDetailFields) -> Result<BankDetail> {
        let rows: Vec<BankDetail> = self
            .send(
                self.table(Method::PATCH, &TableQuery::new("bank_details").eq("id", id))
                    .header("Prefer", "return=representation")
                    .json(fields),
                BankPanelError::Store,
            )
            .await?;
        rows.into_iter().next().ok_or_else(|| BankPanelError::not_found("Bank detail not found"))
    }

    async fn delete_bank_detail(&self, id: &str) -> Result<()> {
        self.send_raw(
            self.table(Method::DELETE, &TableQuery::new("bank_details").eq("id", id)),
            BankPanelError::Store,
        )
        .await?;
        Ok(())
    }
}
