use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesQuery {
    /// `nextCursor` from the previous page
    #[serde(default)]
    pub cursor: Option<String>,

    /// Page size, 1-100 (default: 20)
    #[serde(default)]
    pub limit: Option<u32>,
}
