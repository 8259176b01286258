// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log requester addresses in clear instead of as salted hashes
    pub enable_user_identifiers: bool,
    pub hash_salt: String,
}

impl LoggingConfig {
    pub(crate) fn from_env() -> Self {
        let hash_salt = std::env::var("LOG_HASH_SALT").unwrap_or_default();
        if hash_salt.is_empty() {
            tracing::warn!("LOG_HASH_SALT is not set; requester hashes are unsalted");
        }

        Self {
            enable_user_identifiers: std::env::var("LOG_USER_IDENTIFIERS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            hash_salt,
        }
    }

    /// Render a requester address for logs according to the privacy setting
    pub fn requester_label(&self, address: &str) -> String {
        if self.enable_user_identifiers {
            address.to_string()
        } else {
            crate::utils::log_safe_id(&address.to_lowercase(), &self.hash_salt)
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_user_identifiers: false,
            hash_salt: String::new(),
        }
    }
}
