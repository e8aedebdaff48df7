use crate::domain::bundle::SearchSettings;
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;
use url::Url;

pub const DEFAULT_STOPWORDS: &[&str] = &[
    "tour",
    "tours",
    "trip",
    "experience",
    "experiences",
    "with",
    "and",
    "the",
    "from",
    "day",
    "half",
    "optional",
    "best",
    "top",
    "tickets",
    "ticket",
];

/// 長度小於等於此值的字會被略過
const MIN_WORD_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        )
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_STOPWORDS.iter())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// 依優先順序挑出關鍵字：先 tags，後標題
pub fn keywords(title: &str, tags: &[String], stopwords: &StopWords, max_words: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .flat_map(|tag| words(tag))
        .chain(words(title))
        .filter(|w| w.chars().count() > MIN_WORD_LEN)
        .filter(|w| !stopwords.contains(w))
        .filter(|w| seen.insert(w.clone()))
        .take(max_words)
        .collect()
}

/// Compact search phrase: tag words first, then title words.
///
/// Duplicates, stop words and words of two characters or fewer are dropped and the
/// result is cut to `max_words`. An empty result falls back to `"<location> tours"`.
pub fn build_phrase(
    title: &str,
    tags: &[String],
    stopwords: &StopWords,
    max_words: usize,
    location: &str,
) -> String {
    phrase_from_keywords(&keywords(title, tags, stopwords, max_words), location)
}

/// 已挑好的關鍵字組成片語；沒有關鍵字時使用 fallback
pub fn phrase_from_keywords(keywords: &[String], location: &str) -> String {
    if keywords.is_empty() {
        return fallback_phrase(location);
    }
    keywords.join(" ")
}

/// 搜尋字串：地點加關鍵字；沒有關鍵字時使用 fallback
pub fn search_text(location: &str, keywords: &[String]) -> String {
    if keywords.is_empty() {
        return fallback_phrase(location);
    }
    let location = collapse(location);
    if location.is_empty() {
        keywords.join(" ")
    } else {
        format!("{} {}", location, keywords.join(" "))
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fallback_phrase(location: &str) -> String {
    let location = collapse(location);
    if location.is_empty() {
        "tours".to_string()
    } else {
        format!("{} tours", location)
    }
}

/// 產生搜尋連結；tour 本身有訂購網址時優先使用
#[derive(Debug, Clone)]
pub struct SearchLinkBuilder {
    base: Url,
    partner_id: Option<String>,
    campaign: Option<String>,
}

impl SearchLinkBuilder {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let base = Url::parse(&settings.base_url).map_err(|e| EtlError::InvalidConfigValueError {
            field: "search.base_url".to_string(),
            value: settings.base_url.clone(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self {
            base,
            partner_id: settings.partner_id.clone(),
            campaign: settings.campaign.clone(),
        })
    }

    pub fn search_url(&self, text: &str) -> String {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("text", text);
            if let Some(pid) = &self.partner_id {
                query.append_pair("pid", pid);
            }
            if let Some(mcid) = &self.campaign {
                query.append_pair("mcid", mcid);
            }
        }
        url.to_string()
    }

    pub fn link_for(&self, booking_url: Option<&str>, text: &str) -> String {
        match booking_url {
            Some(direct) => direct.to_string(),
            None => self.search_url(text),
        }
    }
}
