use serde::{Deserialize, Serialize};

/// One item of the search API's `items` array.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

impl SearchResult {
    pub fn new(title: &str, link: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
        }
    }
}

/// A snippet scored against the query. `index` is its position in the
/// search result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSnippet {
    pub index: usize,
    pub snippet: String,
    pub score: f32,
}
