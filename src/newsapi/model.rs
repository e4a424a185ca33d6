use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::wire::de_null_default;
use crate::news::{ArticleSource, NewsArticle, key_phrases};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Source,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub content: Option<String>,
}

/// `/top-headlines` and `/everything`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default, deserialize_with = "de_null_default")]
    pub articles: Vec<Article>,
}

impl From<&Article> for NewsArticle {
    fn from(a: &Article) -> Self {
        let text = match &a.description {
            Some(d) => format!("{} {d}", a.title),
            None => a.title.clone(),
        };
        Self {
            id: format!("newsapi_{}", a.url),
            headline: a.title.clone(),
            summary: a
                .description
                .clone()
                .unwrap_or_else(|| "No description available".to_string()),
            sentiment_score: None,
            key_phrases: key_phrases(&text),
            source: ArticleSource {
                name: a.source.name.clone(),
                published_at: a.published_at,
            },
            original_url: a.url.clone(),
            symbol: None,
        }
    }
}
