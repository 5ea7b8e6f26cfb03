//! Stock photo search, proxied so the access key never reaches the browser.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Secret;
use crate::models::image::StockImage;

pub const UNSPLASH_API_BASE: &str = "https://api.unsplash.com";
pub const DEFAULT_PER_PAGE: u32 = 8;
const MAX_PER_PAGE: u32 = 30;
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Error)]
pub enum ImageSearchError {
    #[error("image search unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image search answered with status {0}")]
    Status(u16),
}

#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &str, per_page: u32)
        -> Result<Vec<StockImage>, ImageSearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    id: String,
    description: Option<String>,
    alt_description: Option<String>,
    urls: PhotoUrls,
    user: Option<Photographer>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    thumb: String,
    regular: String,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: Option<String>,
    links: Option<PhotographerLinks>,
}

#[derive(Debug, Deserialize)]
struct PhotographerLinks {
    html: Option<String>,
}

impl From<Photo> for StockImage {
    fn from(photo: Photo) -> Self {
        let (author_name, author_link) = match photo.user {
            Some(user) => (user.name, user.links.and_then(|l| l.html)),
            None => (None, None),
        };
        Self {
            id: photo.id,
            description: photo.description.or(photo.alt_description),
            thumb_url: photo.urls.thumb,
            regular_url: photo.urls.regular,
            author_name,
            author_link,
        }
    }
}

pub struct UnsplashClient {
    http: Client,
    access_key: Secret,
    base_url: String,
}

impl UnsplashClient {
    pub fn new(access_key: Secret) -> Result<Self, reqwest::Error> {
        Self::with_base_url(access_key, UNSPLASH_API_BASE)
    }

    pub fn with_base_url(
        access_key: Secret,
        base_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().build()?,
            access_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<StockImage>, ImageSearchError> {
        let response = self
            .http
            .get(format!("{}/search/photos", self.base_url))
            .header("Accept-Version", "v1")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Client-ID {}", self.access_key.expose()),
            )
            .query(&[("query", query.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageSearchError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.results.into_iter().map(StockImage::from).collect())
    }
}

/// Searches for images to illustrate an event. Too-short queries return
/// nothing without an upstream call, and upstream failures degrade to an
/// empty result so the event form keeps working.
pub async fn search_images(
    images: &dyn ImageSearch,
    query: &str,
    per_page: Option<u32>,
) -> Vec<StockImage> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

    match images.search(query, per_page).await {
        Ok(found) => {
            debug!(query, count = found.len(), "Image search completed");
            found
        }
        Err(e) => {
            warn!(error = %e, query, "Image search failed, returning no results");
            Vec::new()
        }
    }
}
