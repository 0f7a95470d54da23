use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Indian defence vocabulary used when no keyword list is configured.
pub static DEFAULT_KEYWORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    [
        // Organisations and selection
        "drdo",
        "ssb",
        "cds",
        "afcat",
        "isro",
        "ordnance",
        "defence",
        "defense",
        "military",
        "armed forces",
        "soldier",
        "officer",
        "regiment",
        "battalion",
        "brigade",
        // Services
        "army",
        "navy",
        "naval",
        "air force",
        "iaf",
        "coast guard",
        "bsf",
        "crpf",
        "itbp",
        "nsg",
        "assam rifles",
        // Special forces
        "marcos",
        "garud",
        "para sf",
        "sf",
        "ghatak",
        "commando",
        // Programmes and platforms
        "missile",
        "brahmos",
        "agni",
        "prithvi",
        "akash",
        "astra",
        "tejas",
        "rafale",
        "sukhoi",
        "arjun",
        "pinaka",
        "vikrant",
        "vikramaditya",
        "arihant",
        "submarine",
        "frigate",
        "destroyer",
        "fighter",
        "tank",
        "radar",
        "kargil",
        "surgical strike",
    ]
    .into_iter()
    .map(|k| k.to_string())
    .collect()
});

/// True iff any keyword occurs anywhere in the lowercased query.
///
/// Plain substring matching: "sf" also matches "misfire". Keywords are
/// expected to be lowercase already.
pub fn is_in_scope(query: &str, keywords: &HashSet<String>) -> bool {
    let query = query.to_lowercase();
    keywords.iter().any(|k| query.contains(k.as_str()))
}

/// Scope gate in front of the search stage.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: HashSet<String>,
}

impl RelevanceFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &HashSet<String> {
        &self.keywords
    }

    pub fn is_in_scope(&self, query: &str) -> bool {
        is_in_scope(query, &self.keywords)
    }
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.clone(),
        }
    }
}
