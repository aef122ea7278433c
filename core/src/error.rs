use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Customer {customer_id} not found in the system")]
    CustomerNotFound { customer_id: String },

    #[error("No active pension found for customer {customer_id} ({customer_name})")]
    NoActivePension {
        customer_id: String,
        customer_name: String,
    },

    #[error("Pension {pension_id} not found for customer {customer_id}")]
    PensionNotFound {
        customer_id: String,
        pension_id: String,
    },

    #[error("Financial status not found for customer {customer_id}")]
    FinancialStatusNotFound { customer_id: String },

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    /// Stable machine-readable category, surfaced next to the message in
    /// tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            DeskError::Database(_) => "database",
            DeskError::Serialization(_) => "serialization",
            DeskError::CustomerNotFound { .. }
            | DeskError::NoActivePension { .. }
            | DeskError::PensionNotFound { .. }
            | DeskError::FinancialStatusNotFound { .. } => "not_found",
            DeskError::InvalidArgument { .. } => "invalid_argument",
            DeskError::UnknownTool { .. } => "unknown_tool",
            DeskError::Other(_) => "internal",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == "not_found"
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
