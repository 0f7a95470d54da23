//! Snippet selection strategies.
//!
//! Each strategy takes the raw search results and returns the snippets that
//! are passed on to the summarizer (or straight back to the client). The
//! returned vector is never empty; "nothing usable" is an error.

use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;

use crate::analyzer::{AllowListCharFilter, CharacterFilter, take_words, word_count};
use crate::data_models::{ScoredSnippet, SearchResult};
use crate::embed::{Embedder, cosine_similarity};
use crate::error::PipelineError;

pub const DEFAULT_DENYLIST: &[&str] = &[
    "click here",
    "read more",
    "subscribe",
    "sign up",
    "sign in",
    "log in",
    "login",
    "cookie",
    "advertisement",
    "sponsored",
    "javascript",
    "privacy policy",
    "terms of use",
    "all rights reserved",
];

pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "drdo.gov.in",
    "mod.gov.in",
    "pib.gov.in",
    "indianarmy.nic.in",
    "indiannavy.nic.in",
    "indianairforce.nic.in",
    "joinindianarmy.nic.in",
    "joinindiannavy.gov.in",
    "careerindianairforce.cdac.in",
    "upsc.gov.in",
    "isro.gov.in",
    "hal-india.co.in",
    "bel-india.in",
    "wikipedia.org",
];

#[async_trait]
pub trait SnippetSelector: Send + Sync {
    fn name(&self) -> &'static str;

    /// The output is already the client-facing answer and must not be summarized.
    fn is_final(&self) -> bool {
        false
    }

    async fn select(
        &self,
        query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<String>, PipelineError>;
}

fn non_empty(selected: Vec<String>) -> Result<Vec<String>, PipelineError> {
    if selected.is_empty() {
        Err(PipelineError::NoUsefulInformation)
    } else {
        Ok(selected)
    }
}

/// First `n` results, as returned by the search API.
pub struct TopN {
    n: usize,
}

impl TopN {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

#[async_trait]
impl SnippetSelector for TopN {
    fn name(&self) -> &'static str {
        "top_n"
    }

    async fn select(
        &self,
        _query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<String>, PipelineError> {
        let selected = results
            .iter()
            .take(self.n)
            .map(|r| r.snippet.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        non_empty(selected)
    }
}

/// Snippets in order until `ceiling` words; the last one is cut at the word
/// level so the total lands exactly on the ceiling.
pub struct WordBudget {
    ceiling: usize,
}

impl WordBudget {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    pub fn accumulate<'a, I>(&self, snippets: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut used = 0usize;
        let mut out = Vec::new();
        for snippet in snippets {
            if used >= self.ceiling {
                break;
            }
            let words = word_count(snippet);
            if words == 0 {
                continue;
            }
            let remaining = self.ceiling - used;
            if words <= remaining {
                out.push(snippet.trim().to_string());
                used += words;
            } else {
                out.push(take_words(snippet, remaining));
                used += remaining;
            }
        }
        out
    }
}

#[async_trait]
impl SnippetSelector for WordBudget {
    fn name(&self) -> &'static str {
        "word_budget"
    }

    async fn select(
        &self,
        _query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<String>, PipelineError> {
        non_empty(self.accumulate(results.iter().map(|r| r.snippet.as_str())))
    }
}

/// Heuristic text quality gate with a first-non-empty fallback.
pub struct QualityFilter {
    min_words: usize,
    max_snippets: usize,
    denylist: Vec<String>,
}

impl QualityFilter {
    pub fn new<I, S>(min_words: usize, max_snippets: usize, denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            min_words,
            max_snippets,
            denylist: denylist
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_acceptable(&self, snippet: &str) -> bool {
        let trimmed = snippet.trim();
        if trimmed.is_empty() {
            return false;
        }
        if trimmed.contains("...") || trimmed.contains('…') {
            return false;
        }
        if word_count(trimmed) < self.min_words {
            return false;
        }
        let lower = trimmed.to_lowercase();
        !self.denylist.iter().any(|d| lower.contains(d.as_str()))
    }
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self::new(10, 5, DEFAULT_DENYLIST.iter().copied())
    }
}

#[async_trait]
impl SnippetSelector for QualityFilter {
    fn name(&self) -> &'static str {
        "quality"
    }

    async fn select(
        &self,
        _query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<String>, PipelineError> {
        let selected: Vec<String> = results
            .iter()
            .map(|r| r.snippet.trim())
            .filter(|s| self.is_acceptable(s))
            .take(self.max_snippets)
            .map(|s| s.to_string())
            .collect();
        if !selected.is_empty() {
            return Ok(selected);
        }

        log::info!("quality filter rejected every snippet, using fallback");
        results
            .iter()
            .map(|r| r.snippet.trim())
            .find(|s| !s.is_empty())
            .map(|s| vec![s.to_string()])
            .ok_or(PipelineError::NoUsefulInformation)
    }
}

/// Scores every snippet against the query and keeps the best. Sorting is
/// stable, so equal scores keep result order.
pub fn rank_snippets(
    query_embedding: &[f32],
    snippets: Vec<(usize, String, Vec<f32>)>,
) -> Vec<ScoredSnippet> {
    let mut scored: Vec<ScoredSnippet> = snippets
        .into_iter()
        .map(|(index, snippet, embedding)| ScoredSnippet {
            index,
            snippet,
            score: cosine_similarity(query_embedding, &embedding),
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Strips disallowed characters (optional) and then truncates to `max_chars`.
/// Stripping has to come first, otherwise the cut point moves.
pub fn clean_context(text: String, strip: bool, max_chars: usize) -> String {
    let text = if strip {
        AllowListCharFilter.filter(text)
    } else {
        text
    };
    text.chars().take(max_chars).collect()
}

pub struct SemanticRank {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    strip: bool,
    max_chars: usize,
}

impl SemanticRank {
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize, strip: bool, max_chars: usize) -> Self {
        Self {
            embedder,
            top_k,
            strip,
            max_chars,
        }
    }
}

#[async_trait]
impl SnippetSelector for SemanticRank {
    fn name(&self) -> &'static str {
        "semantic"
    }

    async fn select(
        &self,
        query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<String>, PipelineError> {
        let candidates: Vec<(usize, String)> = results
            .iter()
            .enumerate()
            .map(|(idx, r)| (idx, r.snippet.trim().to_string()))
            .filter(|(_, s)| !s.is_empty())
            .collect();
        if candidates.is_empty() {
            return Err(PipelineError::NoUsefulInformation);
        }

        // query first, then every candidate, in one call
        let mut texts = Vec::with_capacity(candidates.len() + 1);
        texts.push(query.to_string());
        texts.extend(candidates.iter().map(|(_, s)| s.clone()));
        let mut embeddings = self.embedder.embed(&texts).await?.into_iter();
        let query_embedding = embeddings.next().unwrap_or_default();

        let ranked = rank_snippets(
            &query_embedding,
            candidates
                .into_iter()
                .zip(embeddings)
                .map(|((idx, s), e)| (idx, s, e))
                .collect(),
        );

        let joined = ranked
            .into_iter()
            .take(self.top_k)
            .map(|s| s.snippet)
            .collect::<Vec<String>>()
            .join(" ");
        let context = clean_context(joined, self.strip, self.max_chars);
        if context.trim().is_empty() {
            return Err(PipelineError::NoUsefulInformation);
        }
        Ok(vec![context])
    }
}

/// Keeps snippets whose link host equals or contains a trusted domain.
pub struct TrustedDomain {
    domains: Vec<String>,
}

impl TrustedDomain {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn is_trusted(&self, link: &str) -> bool {
        let Ok(url) = Url::parse(link) else {
            return false;
        };
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        self.domains
            .iter()
            .any(|d| host == *d || host.contains(d.as_str()))
    }
}

impl Default for TrustedDomain {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_DOMAINS.iter().copied())
    }
}

#[async_trait]
impl SnippetSelector for TrustedDomain {
    fn name(&self) -> &'static str {
        "trusted_domain"
    }

    async fn select(
        &self,
        _query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<String>, PipelineError> {
        let selected: Vec<String> = results
            .iter()
            .filter(|r| self.is_trusted(&r.link))
            .map(|r| r.snippet.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        if selected.is_empty() {
            log::info!("no result came from a trusted domain");
            return Err(PipelineError::OutOfScope);
        }
        Ok(selected)
    }
}

/// `Top Google search results:` followed by `- title: link` lines.
pub struct LinkList {
    count: usize,
}

impl LinkList {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

#[async_trait]
impl SnippetSelector for LinkList {
    fn name(&self) -> &'static str {
        "link_list"
    }

    fn is_final(&self) -> bool {
        true
    }

    async fn select(
        &self,
        _query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<String>, PipelineError> {
        let lines = results
            .iter()
            .take(self.count)
            .map(|r| format!("- {}: {}", r.title, r.link))
            .collect::<Vec<String>>();
        if lines.is_empty() {
            return Err(PipelineError::NoResults);
        }
        Ok(vec![format!("Top Google search results:\n{}", lines.join("\n"))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashingEmbedder;

    fn results(snippets: &[&str]) -> Vec<SearchResult> {
        snippets
            .iter()
            .enumerate()
            .map(|(i, s)| SearchResult::new(&format!("t{i}"), &format!("https://site{i}.com/"), s))
            .collect()
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[tokio::test]
    async fn test_top_n_takes_first_in_order() {
        let selector = TopN::new(3);
        let out = selector
            .select("q", &results(&["a", "b", "c", "d"]))
            .await
            .unwrap();
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_top_n_all_empty() {
        let selector = TopN::new(2);
        let err = selector.select("q", &results(&["", " "])).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoUsefulInformation));
    }

    #[test]
    fn test_word_budget_slices_last_snippet() {
        let budget = WordBudget::new(10);
        let first = words(6);
        let second = words(8);
        let out = budget.accumulate([first.as_str(), second.as_str(), "never reached"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], first);
        assert_eq!(out[1], "w0 w1 w2 w3");
        let total: usize = out.iter().map(|s| word_count(s)).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_word_budget_never_exceeds_ceiling() {
        for ceiling in 1..40 {
            let budget = WordBudget::new(ceiling);
            let snippets: Vec<String> = (1..8).map(words).collect();
            let out = budget.accumulate(snippets.iter().map(|s| s.as_str()));
            let total: usize = out.iter().map(|s| word_count(s)).sum();
            assert!(total <= ceiling, "ceiling {ceiling} exceeded: {total}");
            assert_eq!(total, ceiling.min(28));
        }
    }

    #[test]
    fn test_word_budget_skips_empty() {
        let budget = WordBudget::new(5);
        assert_eq!(budget.accumulate(["", "  ", "one two"]), vec!["one two"]);
    }

    #[test]
    fn test_quality_rules() {
        let filter = QualityFilter::default();
        let good = "The MARCOS are the special forces unit of the Indian Navy formed in 1987.";
        assert!(filter.is_acceptable(good));
        assert!(!filter.is_acceptable(""));
        assert!(!filter.is_acceptable("Too short to be useful."));
        assert!(!filter.is_acceptable(
            "The MARCOS are the special forces unit of the Indian Navy ..."
        ));
        assert!(!filter.is_acceptable(
            "The MARCOS are the special forces unit of the Indian Navy formed in …"
        ));
        assert!(!filter.is_acceptable(
            "Click HERE to learn about the special forces unit of the Indian Navy today"
        ));
    }

    #[tokio::test]
    async fn test_quality_caps_at_five() {
        let filter = QualityFilter::default();
        let good = words(12);
        let snippets: Vec<&str> = std::iter::repeat(good.as_str()).take(8).collect();
        let out = filter.select("q", &results(&snippets)).await.unwrap();
        assert_eq!(out.len(), 5);
    }

    #[tokio::test]
    async fn test_quality_fallback_first_non_empty() {
        let filter = QualityFilter::default();
        let out = filter
            .select("q", &results(&["", "short one", "another short"]))
            .await
            .unwrap();
        assert_eq!(out, vec!["short one"]);
    }

    /// Empty, short, ellipsis, denylisted (mixed case) or valid, by `kind`.
    fn generated_snippet(kind: usize, n: usize) -> String {
        let valid = words(10 + n % 6);
        match kind {
            0 => String::new(),
            1 => words(1 + n % 9),
            2 => format!("{valid} ..."),
            3 => format!("{valid} \u{2026} more"),
            4 => format!("CLICK Here {valid}"),
            5 => format!("{valid} Sign Up today"),
            _ => valid,
        }
    }

    #[tokio::test]
    async fn test_quality_generated_corpora() {
        let filter = QualityFilter::default();
        // small linear congruential generator, fixed seed
        let mut state: u64 = 0x5eed;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as usize
        };

        for round in 0..300 {
            let len = next() % 12;
            let corpus: Vec<String> = (0..len)
                .map(|_| {
                    let n = next();
                    generated_snippet(n % 7, n / 7)
                })
                .collect();
            let refs: Vec<&str> = corpus.iter().map(|s| s.as_str()).collect();
            let outcome = filter.select("q", &results(&refs)).await;

            let acceptable: Vec<&str> = refs
                .iter()
                .map(|s| s.trim())
                .filter(|s| filter.is_acceptable(s))
                .collect();
            let first_non_empty = refs.iter().map(|s| s.trim()).find(|s| !s.is_empty());

            match outcome {
                Ok(out) if !acceptable.is_empty() => {
                    assert!(out.len() <= 5, "round {round}: {} admitted", out.len());
                    assert!(out.iter().all(|s| filter.is_acceptable(s)), "round {round}");
                    assert_eq!(out, acceptable[..acceptable.len().min(5)], "round {round}");
                }
                Ok(out) => {
                    assert_eq!(out, vec![first_non_empty.unwrap()], "round {round}");
                }
                Err(e) => {
                    assert!(first_non_empty.is_none(), "round {round}");
                    assert!(matches!(e, PipelineError::NoUsefulInformation));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_quality_fallback_all_empty() {
        let filter = QualityFilter::default();
        let err = filter.select("q", &results(&["", "   "])).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoUsefulInformation));
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let q = vec![1.0, 0.0];
        let ranked = rank_snippets(
            &q,
            vec![
                (0, "low".to_string(), vec![0.0, 1.0]),
                (1, "tie-a".to_string(), vec![1.0, 1.0]),
                (2, "best".to_string(), vec![1.0, 0.0]),
                (3, "tie-b".to_string(), vec![1.0, 1.0]),
            ],
        );
        let order: Vec<usize> = ranked.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_rank_with_non_finite_embeddings() {
        let q = vec![1.0, 0.0];
        let ranked = rank_snippets(
            &q,
            vec![
                (0, "nan".to_string(), vec![f32::NAN, 1.0]),
                (1, "best".to_string(), vec![1.0, 0.0]),
                (2, "inf".to_string(), vec![f32::INFINITY, 0.0]),
                (3, "half".to_string(), vec![1.0, 1.0]),
            ],
        );
        let order: Vec<usize> = ranked.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert!(ranked.iter().all(|s| s.score.is_finite()));
    }

    #[test]
    fn test_strip_happens_before_truncate() {
        let text = "Test@@@123 ".repeat(200);
        let out = clean_context(text, true, 1000);
        assert_eq!(out.chars().count(), 1000);
        assert!(!out.contains('@'));
        assert!(out.starts_with("Test123 Test123"));
    }

    #[test]
    fn test_no_strip_keeps_characters() {
        let out = clean_context("a@b".to_string(), false, 10);
        assert_eq!(out, "a@b");
    }

    #[tokio::test]
    async fn test_semantic_rank_is_deterministic() {
        let selector = SemanticRank::new(Arc::new(HashingEmbedder::new(256)), 2, true, 1000);
        let items = results(&[
            "Paris is the capital of France.",
            "MARCOS are the marine commandos of the Indian Navy.",
            "",
            "Indian Navy marine commandos train at INS Abhimanyu.",
        ]);
        let first = selector.select("Indian Navy marine commandos", &items).await.unwrap();
        let second = selector.select("Indian Navy marine commandos", &items).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert!(!first[0].contains("Paris"));
        assert!(first[0].contains("commandos"));
    }

    #[tokio::test]
    async fn test_semantic_rank_no_snippets() {
        let selector = SemanticRank::new(Arc::new(HashingEmbedder::new(16)), 3, true, 1000);
        let err = selector.select("q", &results(&["", ""])).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoUsefulInformation));
    }

    #[test]
    fn test_trusted_domain_host_matching() {
        let selector = TrustedDomain::new(["drdo.gov.in", "wikipedia.org"]);
        assert!(selector.is_trusted("https://drdo.gov.in/missiles"));
        assert!(selector.is_trusted("https://www.drdo.gov.in/labs"));
        assert!(selector.is_trusted("https://en.wikipedia.org/wiki/MARCOS"));
        assert!(!selector.is_trusted("https://example.com/drdo.gov.in"));
        assert!(!selector.is_trusted("not a url"));
    }

    #[tokio::test]
    async fn test_trusted_domain_none_is_out_of_scope() {
        let selector = TrustedDomain::default();
        let err = selector
            .select("q", &results(&["a", "b"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::OutOfScope));
    }

    #[tokio::test]
    async fn test_trusted_domain_keeps_matches() {
        let selector = TrustedDomain::default();
        let items = vec![
            SearchResult::new("blog", "https://someblog.com/x", "blog text"),
            SearchResult::new("navy", "https://www.indiannavy.nic.in/marcos", "navy text"),
        ];
        let out = selector.select("q", &items).await.unwrap();
        assert_eq!(out, vec!["navy text"]);
    }

    #[tokio::test]
    async fn test_link_list_format() {
        let selector = LinkList::new(3);
        let out = selector
            .select("q", &results(&["a", "b", "c", "d"]))
            .await
            .unwrap();
        assert_eq!(
            out[0],
            "Top Google search results:\n- t0: https://site0.com/\n- t1: https://site1.com/\n- t2: https://site2.com/"
        );
    }
}
