use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("{table} record not found: {id}")]
    NotFound { table: String, id: String },

    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("invalid week '{0}': expected YYYY-MM-DD or YYYY-Www")]
    InvalidWeek(String),

    #[error("invalid quarter '{0}': expected YYYY-Qn")]
    InvalidQuarter(String),

    #[error("invalid month {year}-{month}: month must be 1-12")]
    InvalidMonth { year: i32, month: u32 },

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("backend row is malformed: {0}")]
    MalformedRow(String),

    #[error("config file not found: {0}")]
    ConfigMissing(String),

    #[error("config file already exists: {0}")]
    ConfigExists(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DashError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DashError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        DashError::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
