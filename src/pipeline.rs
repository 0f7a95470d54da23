use std::sync::Arc;

use crate::analyzer::word_count;
use crate::error::PipelineError;
use crate::filter::RelevanceFilter;
use crate::search::SearchBackend;
use crate::selector::SnippetSelector;
use crate::summarize::Summarizer;

/// Scope gate, optional direct answer, search, selection, optional summary.
/// Immutable once built and shared across requests behind an `Arc`.
pub struct QueryPipeline {
    filter: Option<RelevanceFilter>,
    direct: Option<Arc<dyn Summarizer>>,
    search: Arc<dyn SearchBackend>,
    selector: Box<dyn SnippetSelector>,
    summarizer: Option<Arc<dyn Summarizer>>,
    min_summary_words: usize,
}

impl QueryPipeline {
    pub fn new(search: Arc<dyn SearchBackend>, selector: Box<dyn SnippetSelector>) -> Self {
        Self {
            filter: None,
            direct: None,
            search,
            selector,
            summarizer: None,
            min_summary_words: 20,
        }
    }

    pub fn with_filter(mut self, filter: RelevanceFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Asks `answerer` the question first; search runs only when it fails.
    pub fn with_direct_answer(mut self, answerer: Arc<dyn Summarizer>) -> Self {
        self.direct = Some(answerer);
        self
    }

    pub fn with_summarizer(
        mut self,
        summarizer: Arc<dyn Summarizer>,
        min_summary_words: usize,
    ) -> Self {
        self.summarizer = Some(summarizer);
        self.min_summary_words = min_summary_words;
        self
    }

    pub fn selector_name(&self) -> &'static str {
        self.selector.name()
    }

    pub fn summarizer_name(&self) -> Option<&'static str> {
        self.summarizer.as_ref().map(|s| s.name())
    }

    pub fn direct_answer_name(&self) -> Option<&'static str> {
        self.direct.as_ref().map(|s| s.name())
    }

    pub async fn answer(&self, query: &str) -> Result<String, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        if let Some(filter) = &self.filter {
            if !filter.is_in_scope(query) {
                log::info!("rejected out of scope query: {query:?}");
                return Err(PipelineError::OutOfScope);
            }
        }

        if let Some(direct) = &self.direct {
            match direct.summarize(query).await {
                Ok(answer) if !answer.trim().is_empty() => return Ok(answer),
                Ok(_) => log::warn!("{} gave an empty answer, searching instead", direct.name()),
                Err(e) => log::warn!("{} failed, searching instead, error: {e:#}", direct.name()),
            }
        }

        let results = self.search.search(query).await.map_err(|e| {
            log::error!("search failed for {query:?}, error: {e:#}");
            PipelineError::from(e)
        })?;
        if results.is_empty() {
            return Err(PipelineError::NoResults);
        }

        let snippets = self.selector.select(query, &results).await?;
        log::info!(
            "{} selected {} of {} snippets",
            self.selector.name(),
            snippets.len(),
            results.len()
        );

        let summarizer = match &self.summarizer {
            Some(summarizer) if !self.selector.is_final() => summarizer,
            _ => return Ok(snippets.join("\n\n")),
        };

        let context = snippets.join(" ");
        summarize_guarded(summarizer.as_ref(), &context, self.min_summary_words).await
    }
}

/// Calls the summarizer only when `text` has at least `min_words` words.
pub async fn summarize_guarded(
    summarizer: &dyn Summarizer,
    text: &str,
    min_words: usize,
) -> Result<String, PipelineError> {
    let words = word_count(text);
    if words < min_words {
        log::info!("not summarizing, {words} words is under {min_words}");
        return Err(PipelineError::NotEnoughContext);
    }
    summarizer.summarize(text).await.map_err(|e| {
        log::error!("{} summarizer failed, error: {e:#}", summarizer.name());
        PipelineError::from(e)
    })
}
