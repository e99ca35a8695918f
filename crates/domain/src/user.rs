//! User summaries joined into admin listings.

use common::UserId;
use serde::{Deserialize, Serialize};

/// The owner details shown next to a cart line.
///
/// Accounts themselves are managed by the identity provider; only the
/// fields needed for display are kept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub names: Option<String>,
}

impl UserSummary {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            names: None,
        }
    }

    /// Sets the display name.
    pub fn with_names(mut self, names: impl Into<String>) -> Self {
        self.names = Some(names.into());
        self
    }
}
