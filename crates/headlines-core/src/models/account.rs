use serde::{Deserialize, Serialize};

/// Primary key of the single account this client manages.
pub const CURRENT_ACCOUNT_PK: i64 = 1;

/// Durable account record. Replaced wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProperties {
    pub pk: i64,
    pub token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl AccountProperties {
    /// Account record for the current (only) account with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            pk: CURRENT_ACCOUNT_PK,
            token: token.into(),
            email: None,
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Token with all but the last four characters masked, for display.
    pub fn masked_token(&self) -> String {
        let len = self.token.chars().count();
        if len <= 4 {
            return "*".repeat(len);
        }
        let tail: String = self.token.chars().skip(len - 4).collect();
        format!("{}{}", "*".repeat(len - 4), tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_current_account_key() {
        let props = AccountProperties::new("abc123");
        assert_eq!(props.pk, CURRENT_ACCOUNT_PK);
        assert_eq!(props.token, "abc123");
        assert!(props.email.is_none());
    }

    #[test]
    fn test_masked_token() {
        assert_eq!(AccountProperties::new("abcdef123456").masked_token(), "********3456");
        assert_eq!(AccountProperties::new("abc").masked_token(), "***");
        assert_eq!(AccountProperties::new("").masked_token(), "");
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let props: AccountProperties =
            serde_json::from_str(r#"{"pk": 1, "token": "t"}"#).expect("valid account json");
        assert_eq!(props, AccountProperties::new("t"));
    }
}
