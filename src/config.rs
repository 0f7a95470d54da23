use anyhow::{Result, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_SUMMARY_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-cnn";
pub const DEFAULT_EMBEDDING_URL: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction/sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Custom Search answers 400 for `num` outside 1..=10.
pub const MAX_RESULT_COUNT: usize = 10;

/// How `/chat` produces an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    /// Scope gate, search, selection, optional summary.
    Search,
    /// Ask the chat model the question directly; search only when that call fails.
    ChatFirst,
}

impl FromStr for AnswerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "search" => Ok(AnswerMode::Search),
            "chat_first" => Ok(AnswerMode::ChatFirst),
            other => bail!("Unknown answer mode: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    TopN,
    WordBudget,
    Quality,
    Semantic,
    TrustedDomain,
    LinkList,
}

impl FromStr for SelectorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "top_n" | "topn" => Ok(SelectorKind::TopN),
            "word_budget" => Ok(SelectorKind::WordBudget),
            "quality" => Ok(SelectorKind::Quality),
            "semantic" => Ok(SelectorKind::Semantic),
            "trusted_domain" => Ok(SelectorKind::TrustedDomain),
            "link_list" => Ok(SelectorKind::LinkList),
            other => bail!("Unknown snippet selector: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    Local,
    Remote,
}

impl FromStr for EmbedderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(EmbedderKind::Local),
            "remote" => Ok(EmbedderKind::Remote),
            other => bail!("Unknown embedder: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarizerKind {
    None,
    Inference,
    Chat,
}

impl FromStr for SummarizerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(SummarizerKind::None),
            "inference" => Ok(SummarizerKind::Inference),
            "chat" => Ok(SummarizerKind::Chat),
            other => bail!("Unknown summarizer: {other}"),
        }
    }
}

/// Process configuration. Built once at startup and never mutated.
///
/// Credentials are not validated here; a missing key only shows up later as an
/// error body from the downstream API.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub mode: AnswerMode,

    pub google_api_key: String,
    pub google_cx: String,
    pub search_url: String,
    pub result_count: usize,

    pub scope_filter: bool,
    /// `None` means the built-in defence keyword list.
    pub keywords: Option<Vec<String>>,

    pub selector: SelectorKind,
    pub top_n: usize,
    pub word_budget: usize,
    pub semantic_top_k: usize,
    pub max_context_chars: usize,
    pub strip_chars: bool,
    /// `None` means the built-in trusted domain list.
    pub trusted_domains: Option<Vec<String>>,

    pub embedder: EmbedderKind,
    pub embedding_dims: usize,
    pub embedding_url: String,

    pub summarizer: SummarizerKind,
    pub hf_api_token: String,
    pub summary_url: String,
    pub summary_delimiter: Option<String>,
    pub min_summary_words: usize,

    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,

    pub structured_errors: bool,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_env_or_default = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_string())
        };
        let get_parsed = |key: &str, default: usize| -> usize {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let get_flag = |key: &str, default: bool| -> bool {
            lookup(key).map(|v| parse_flag(&v, default)).unwrap_or(default)
        };

        let mode: AnswerMode = get_env_or_default("DEFGEN_MODE", "search").parse()?;
        let default_selector = match mode {
            AnswerMode::Search => "quality",
            AnswerMode::ChatFirst => "link_list",
        };

        let keywords = lookup("DEFGEN_KEYWORDS").map(|v| split_list(&v));
        let keywords = match keywords {
            Some(list) if list.is_empty() => {
                log::warn!("DEFGEN_KEYWORDS is empty, using the built-in keyword list");
                None
            }
            other => other,
        };

        Ok(Config {
            bind_addr: get_env_or_default("DEFGEN_BIND_ADDR", "0.0.0.0:8000"),
            mode,

            google_api_key: get_env_or_default("GOOGLE_API_KEY", ""),
            google_cx: get_env_or_default("GOOGLE_CX", ""),
            search_url: get_env_or_default("GOOGLE_SEARCH_URL", DEFAULT_SEARCH_URL),
            result_count: get_parsed("DEFGEN_RESULT_COUNT", MAX_RESULT_COUNT)
                .clamp(1, MAX_RESULT_COUNT),

            scope_filter: get_flag("DEFGEN_SCOPE_FILTER", true),
            keywords,

            selector: get_env_or_default("DEFGEN_SELECTOR", default_selector).parse()?,
            top_n: get_parsed("DEFGEN_TOP_N", 3),
            word_budget: get_parsed("DEFGEN_WORD_BUDGET", 5000),
            semantic_top_k: get_parsed("DEFGEN_SEMANTIC_TOP_K", 3),
            max_context_chars: get_parsed("DEFGEN_MAX_CONTEXT_CHARS", 1000),
            strip_chars: get_flag("DEFGEN_STRIP_CHARS", true),
            trusted_domains: lookup("DEFGEN_TRUSTED_DOMAINS").map(|v| split_list(&v)),

            embedder: get_env_or_default("DEFGEN_EMBEDDER", "local").parse()?,
            embedding_dims: get_parsed("DEFGEN_EMBEDDING_DIMS", 384),
            embedding_url: get_env_or_default("HF_EMBEDDING_URL", DEFAULT_EMBEDDING_URL),

            summarizer: get_env_or_default("DEFGEN_SUMMARIZER", "inference").parse()?,
            hf_api_token: get_env_or_default("HF_API_TOKEN", ""),
            summary_url: get_env_or_default("HF_SUMMARY_URL", DEFAULT_SUMMARY_URL),
            summary_delimiter: lookup("DEFGEN_SUMMARY_DELIMITER").filter(|d| !d.trim().is_empty()),
            min_summary_words: get_parsed("DEFGEN_MIN_SUMMARY_WORDS", 20),

            openai_api_key: get_env_or_default("OPENAI_API_KEY", ""),
            openai_base_url: get_env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_URL),
            openai_model: get_env_or_default("OPENAI_MODEL", "gpt-3.5-turbo"),

            structured_errors: get_flag("DEFGEN_STRUCTURED_ERRORS", false),
        })
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Comma separated list, lowercased, blanks dropped.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
