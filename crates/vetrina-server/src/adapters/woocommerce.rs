//! WooCommerce catalog adapter
//!
//! Pulls published products from a WooCommerce-style REST endpoint and
//! normalizes them into domain `Product`s. Records missing an id or name
//! fail individually; the page as a whole still succeeds.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use vetrina::{CatalogPage, CatalogSource, DomainError, Product};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// WooCommerce REST client
pub struct WooCatalog {
    client: Client,
    base_url: String,
    key: String,
    secret: String,
    tag_pattern: Regex,
    embedding_model: String,
}

/// Raw upstream record; everything is optional until normalization.
#[derive(Debug, Deserialize)]
struct RawProduct {
    id: Option<i64>,
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    categories: Vec<NamedTerm>,
    #[serde(default)]
    tags: Vec<NamedTerm>,
    #[serde(default)]
    price: String,
    #[serde(default)]
    stock_status: String,
    #[serde(default)]
    images: Vec<ImageRef>,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    average_rating: String,
    #[serde(default)]
    rating_count: i64,
}

#[derive(Debug, Deserialize)]
struct NamedTerm {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    src: String,
}

impl WooCatalog {
    pub fn new(
        base_url: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            key: key.into(),
            secret: secret.into(),
            // Good enough for WooCommerce descriptions; not a full parser
            tag_pattern: Regex::new(r"<[^>]+>").expect("valid pattern"),
            embedding_model: embedding_model.into(),
        }
    }

    fn clean_html(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }
        let stripped = self.tag_pattern.replace_all(html, "");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn normalize(&self, raw: RawProduct) -> Result<Product, String> {
        let id = raw
            .id
            .ok_or_else(|| "record without id".to_string())?;
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| format!("product {} without name", id))?;

        Ok(Product {
            id,
            name,
            description: self.clean_html(&raw.description),
            short_description: self.clean_html(&raw.short_description),
            categories: raw.categories.into_iter().map(|t| t.name).collect(),
            tags: raw.tags.into_iter().map(|t| t.name).collect(),
            price: parse_price(&raw.price),
            currency: "INR".to_string(),
            stock_status: if raw.stock_status.is_empty() {
                "outofstock".to_string()
            } else {
                raw.stock_status
            },
            image_url: raw.images.into_iter().next().map(|i| i.src),
            permalink: raw.permalink,
            rating: raw.average_rating.parse().unwrap_or(0.0),
            review_count: raw.rating_count,
            synced_at: Utc::now(),
            embedding_model: self.embedding_model.clone(),
        })
    }
}

/// Parse an upstream price string, tolerating currency symbols and
/// thousands separators ("₹1,299.00" -> 1299.0).
fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

#[async_trait]
impl CatalogSource for WooCatalog {
    async fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
        modified_after: Option<DateTime<Utc>>,
    ) -> Result<CatalogPage, DomainError> {
        let mut request = self
            .client
            .get(&self.base_url)
            .basic_auth(&self.key, Some(&self.secret))
            .query(&[
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
                ("status", "publish".to_string()),
            ]);
        if let Some(after) = modified_after {
            request = request.query(&[("modified_after", after.to_rfc3339())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Catalog(format!("catalog request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Catalog(format!(
                "catalog returned {}",
                response.status()
            )));
        }

        let raw: Vec<RawProduct> = response
            .json()
            .await
            .map_err(|e| DomainError::Catalog(format!("catalog response malformed: {}", e)))?;

        let fetched = raw.len();
        let mut page_out = CatalogPage {
            has_more: fetched as u32 == per_page,
            ..CatalogPage::default()
        };
        for record in raw {
            match self.normalize(record) {
                Ok(product) => page_out.products.push(product),
                Err(reason) => {
                    tracing::warn!("Skipping catalog record: {}", reason);
                    page_out.failures.push(reason);
                }
            }
        }

        tracing::debug!(
            "Fetched catalog page {}: {} ok, {} failed",
            page,
            page_out.products.len(),
            page_out.failures.len()
        );
        Ok(page_out)
    }
}
