//! Per-registry configuration passed at construction.

use std::str::FromStr;

pub const DEFAULT_LIMIT: i64 = 25;
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// How request-scoped failures map to HTTP status codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorStatus {
    /// Every failure is 404 (405 for unregistered verbs). Wire-compatible with existing clients.
    #[default]
    Legacy,
    Differentiated,
}

impl FromStr for ErrorStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(ErrorStatus::Legacy),
            "differentiated" => Ok(ErrorStatus::Differentiated),
            _ => Err(()),
        }
    }
}

/// Body returned by a successful PATCH.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateResponse {
    /// The decoded update payload (zero value with the request's fields applied).
    /// Its id is always the one from the path; an id in the body is ignored.
    #[default]
    Payload,
    /// The persisted record after the merge.
    Merged,
}

impl FromStr for UpdateResponse {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "payload" => Ok(UpdateResponse::Payload),
            "merged" => Ok(UpdateResponse::Merged),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Added in front of every resource path (slashes trimmed).
    pub prefix: String,
    /// Base URL for the default static resolver.
    pub base_url: String,
    pub default_limit: i64,
    pub content_type: String,
    pub error_status: ErrorStatus,
    pub update_response: UpdateResponse,
    /// Schema qualifier for SQL tables. None uses the connection's search_path.
    pub db_schema: Option<String>,
    pub body_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            prefix: String::new(),
            base_url: String::new(),
            default_limit: DEFAULT_LIMIT,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            error_status: ErrorStatus::default(),
            update_response: UpdateResponse::default(),
            db_schema: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ApiConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_error_status(mut self, error_status: ErrorStatus) -> Self {
        self.error_status = error_status;
        self
    }

    pub fn with_update_response(mut self, update_response: UpdateResponse) -> Self {
        self.update_response = update_response;
        self
    }

    pub fn with_db_schema(mut self, schema: impl Into<String>) -> Self {
        self.db_schema = Some(schema.into());
        self
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Prefix with surrounding slashes removed.
    pub fn trimmed_prefix(&self) -> &str {
        self.prefix.trim_matches('/')
    }
}
