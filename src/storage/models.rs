use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The primary OAuth credential triple, replaced as a unit by a refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl Credentials {
    /// Value for an `Authorization` header, e.g. `Bearer abc`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &!self.access_token.is_empty())
            .field("refresh_token", &!self.refresh_token.is_empty())
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Token state for one authenticated end user
#[derive(Clone)]
pub struct UserRecord {
    /// Secondary credential used only for notification delivery
    pub bot_access_token: Option<String>,
    pub credentials: Credentials,
    /// Human-readable label, refreshed on every login
    pub display_name: String,
    /// `iss` claim of the id token, when one was issued
    pub token_issuer: Option<String>,
    /// Provider-assigned identifier, the registry key
    pub user_id: String,
}

impl UserRecord {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            bot_access_token: None,
            credentials,
            display_name: display_name.into(),
            token_issuer: None,
            user_id: user_id.into(),
        }
    }

    pub fn has_bot_token(&self) -> bool {
        self.bot_access_token.is_some()
    }
}

// Token values must never reach the logs.
impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("token_issuer", &self.token_issuer)
            .field("credentials", &self.credentials)
            .field("bot_access_token", &self.bot_access_token.is_some())
            .finish()
    }
}

/// One dispatcher run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Display names that received a notification in this run
    pub recipients: Vec<String>,
    /// Monotonic, gapless sequence number
    pub sequence: u64,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn summary(&self) -> String {
        format!(
            "{} - Notify to: {}",
            self.timestamp.to_rfc3339(),
            self.recipients.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token_values() {
        let mut user = UserRecord::new(
            "U1",
            "Alice",
            Credentials {
                access_token: "secret-access".to_string(),
                refresh_token: "secret-refresh".to_string(),
                token_type: "Bearer".to_string(),
            },
        );
        user.bot_access_token = Some("secret-bot".to_string());

        let printed = format!("{user:?}");
        assert!(printed.contains("Alice"));
        assert!(!printed.contains("secret"));
    }

    #[test]
    fn test_summary_joins_recipients() {
        let entry = HistoryEntry {
            recipients: vec!["Alice".to_string(), "Bob".to_string()],
            sequence: 1,
            timestamp: Utc::now(),
        };
        assert!(entry.summary().ends_with(" - Notify to: Alice, Bob"));

        let empty = HistoryEntry {
            recipients: vec![],
            ..entry
        };
        assert!(empty.summary().ends_with(" - Notify to: "));
    }
}
