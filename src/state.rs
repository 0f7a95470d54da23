use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;

use crate::config::{AnswerMode, Config, EmbedderKind, SelectorKind, SummarizerKind};
use crate::embed::{Embedder, HashingEmbedder, RemoteEmbedder};
use crate::filter::RelevanceFilter;
use crate::pipeline::QueryPipeline;
use crate::search::GoogleSearchClient;
use crate::selector::{
    LinkList, QualityFilter, SemanticRank, SnippetSelector, TopN, TrustedDomain, WordBudget,
};
use crate::summarize::{ChatSummarizer, InferenceSummarizer, Summarizer};

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
    pub structured_errors: bool,
}

impl AppState {
    pub fn new(pipeline: QueryPipeline, structured_errors: bool) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            structured_errors,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;
        let pipeline = build_pipeline(config, client);
        Ok(Self::new(pipeline, config.structured_errors))
    }
}

pub fn build_embedder(config: &Config, client: Client) -> Arc<dyn Embedder> {
    match config.embedder {
        EmbedderKind::Local => Arc::new(HashingEmbedder::new(config.embedding_dims)),
        EmbedderKind::Remote => Arc::new(RemoteEmbedder::new(
            client,
            &config.embedding_url,
            &config.hf_api_token,
        )),
    }
}

pub fn build_selector(config: &Config, client: Client) -> Box<dyn SnippetSelector> {
    match config.selector {
        SelectorKind::TopN => Box::new(TopN::new(config.top_n)),
        SelectorKind::WordBudget => Box::new(WordBudget::new(config.word_budget)),
        SelectorKind::Quality => Box::new(QualityFilter::default()),
        SelectorKind::Semantic => Box::new(SemanticRank::new(
            build_embedder(config, client),
            config.semantic_top_k,
            config.strip_chars,
            config.max_context_chars,
        )),
        SelectorKind::TrustedDomain => match &config.trusted_domains {
            Some(domains) => Box::new(TrustedDomain::new(domains)),
            None => Box::new(TrustedDomain::default()),
        },
        SelectorKind::LinkList => Box::new(LinkList::new(config.top_n)),
    }
}

pub fn build_summarizer(config: &Config, client: Client) -> Option<Arc<dyn Summarizer>> {
    match config.summarizer {
        SummarizerKind::None => None,
        SummarizerKind::Inference => {
            let summarizer =
                InferenceSummarizer::new(client, &config.summary_url, &config.hf_api_token);
            let summarizer = match &config.summary_delimiter {
                Some(delimiter) => summarizer.with_prompt_delimiter(delimiter),
                None => summarizer,
            };
            Some(Arc::new(summarizer))
        }
        SummarizerKind::Chat => Some(Arc::new(ChatSummarizer::new(
            client,
            &config.openai_base_url,
            &config.openai_api_key,
            &config.openai_model,
        ))),
    }
}

/// Wires every stage named in `config`. One HTTP client is shared by all
/// outbound calls.
pub fn build_pipeline(config: &Config, client: Client) -> QueryPipeline {
    let search = Arc::new(GoogleSearchClient::new(
        client.clone(),
        &config.search_url,
        &config.google_api_key,
        &config.google_cx,
        config.result_count,
    ));
    let mut pipeline = QueryPipeline::new(search, build_selector(config, client.clone()));

    if config.scope_filter {
        let filter = match &config.keywords {
            Some(keywords) => RelevanceFilter::new(keywords),
            None => RelevanceFilter::default(),
        };
        pipeline = pipeline.with_filter(filter);
    }

    if config.mode == AnswerMode::ChatFirst {
        pipeline = pipeline.with_direct_answer(Arc::new(ChatSummarizer::direct(
            client.clone(),
            &config.openai_base_url,
            &config.openai_api_key,
            &config.openai_model,
        )));
    }

    if let Some(summarizer) = build_summarizer(config, client) {
        pipeline = pipeline.with_summarizer(summarizer, config.min_summary_words);
    }

    pipeline
}
