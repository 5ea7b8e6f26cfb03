use serde::{Deserialize, Serialize};

/// A stock photo the organizer can attach to an event instead of uploading
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockImage {
    pub id: String,
    pub description: Option<String>,
    pub thumb_url: String,
    pub regular_url: String,
    pub author_name: Option<String>,
    pub author_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSearchQuery {
    #[serde(default)]
    pub query: String,
    pub per_page: Option<u32>,
}
