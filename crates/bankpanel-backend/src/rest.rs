//! Query-string builder for the hosted table API.

/// A filtered, ordered read against one table.
#[derive(Debug, Clone)]
pub struct TableQuery {
    table: String,
    params: Vec<(String, String)>,
}

impl TableQuery {
    pub fn new(table: &str) -> Self {
        Self { table: table.into(), params: vec![] }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns to return; supports embedded selects such as
    /// `*,profiles:staff_id(id,full_name)`.
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.params.push((column.into(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params.push(("order".into(), format!("{column}.{dir}")));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".into(), n.to_string()));
        self
    }

    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), encode_value(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

// Keep the operator syntax readable: `eq.`, `,`, `:`, `(`, `)` and `*` pass through.
fn encode_value(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' | ',' | ':' | '(' | ')' | '*' => {
                out.push(c)
            }
            other => out.push_str(&urlencoding::encode(&other.to_string())),
        }
    }
    out
}

/// Best-effort human message from an upstream error body.
pub fn upstream_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        let q = TableQuery::new("profiles")
            .select("*")
            .eq("role", "staff")
            .order("created_at", false);
        assert_eq!(q.table(), "profiles");
        assert_eq!(q.query_string(), "select=*&role=eq.staff&order=created_at.desc");
    }

    #[test]
    fn test_embedded_select_and_encoding() {
        let q = TableQuery::new("bank_details")
            .select("*,profiles:staff_id(id,full_name)")
            .eq("staff_id", "a b&c")
            .limit(1);
        assert_eq!(
            q.query_string(),
            "select=*,profiles:staff_id(id,full_name)&staff_id=eq.a%20b%26c&limit=1"
        );
    }

    #[test]
    fn test_upstream_message() {
        assert_eq!(
            upstream_message(r#"{"code":422,"msg":"A user with this email address has already been registered"}"#)
                .as_deref(),
            Some("A user with this email address has already been registered")
        );
        assert_eq!(
            upstream_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(upstream_message(r#"{"message":"duplicate key"}"#).as_deref(), Some("duplicate key"));
        assert_eq!(upstream_message("<html>"), None);
    }
}
