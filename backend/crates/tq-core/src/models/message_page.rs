use crate::StoredMessage;

use serde::{Deserialize, Serialize};

/// One page of a tenant's messages, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub data: Vec<StoredMessage>,
    /// Id of the last message on this page when an older page exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
