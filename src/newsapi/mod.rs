//! NewsAPI headlines and full-text search.

mod model;
mod wire;

pub use model::{Article, NewsResponse, Source};

use crate::core::outcome::Outcome;
use crate::core::services::{Endpoint, service_client};
use crate::news::NewsArticle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::General => "general",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    Relevancy,
    Popularity,
    #[default]
    PublishedAt,
}

impl SortBy {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
            SortBy::PublishedAt => "publishedAt",
        }
    }
}

/// Parameters for [`NewsApiClient::search`].
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub sort_by: SortBy,
    pub page_size: u32,
    pub page: u32,
    pub language: String,
}

impl SearchQuery {
    /// Newest first, 20 per page, English.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sort_by: SortBy::default(),
            page_size: 20,
            page: 1,
            language: "en".to_string(),
        }
    }

    #[must_use]
    pub const fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    #[must_use]
    pub const fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

service_client!(
    /// Client for the NewsAPI proxy routes (`/newsapi/...`).
    NewsApiClient,
    wire::check_envelope
);

impl NewsApiClient {
    #[tracing::instrument(skip(self), fields(service = "newsapi"))]
    pub async fn top_headlines(
        &self,
        country: &str,
        category: Option<Category>,
        page_size: u32,
        page: u32,
    ) -> Outcome<NewsResponse> {
        let endpoint = Endpoint::new("top-headlines")
            .param("country", country)
            .param("pageSize", page_size.to_string())
            .param("page", page.to_string())
            .param_opt("category", category.map(Category::as_str));
        let topic = category.map_or("markets", Category::as_str);
        self.core
            .call(endpoint, &self.opts, |fb| fb.news_response(topic, page_size))
            .await
    }

    #[tracing::instrument(skip(self), fields(service = "newsapi", query = %query.query))]
    pub async fn search(&self, query: &SearchQuery) -> Outcome<NewsResponse> {
        let endpoint = Endpoint::new("everything")
            .param("q", query.query.as_str())
            .param("sortBy", query.sort_by.as_str())
            .param("pageSize", query.page_size.to_string())
            .param("page", query.page.to_string())
            .param("language", query.language.as_str());
        self.core
            .call(endpoint, &self.opts, |fb| {
                fb.news_response(&query.query, query.page_size)
            })
            .await
    }

    /// US business headlines as app articles.
    pub async fn business_articles(&self, page_size: u32) -> Outcome<Vec<NewsArticle>> {
        self.top_headlines("us", Some(Category::Business), page_size, 1)
            .await
            .map(|resp| resp.articles.iter().map(NewsArticle::from).collect())
    }
}
