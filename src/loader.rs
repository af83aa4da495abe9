//! Web page loading for the RAG pipeline.
//!
//! [`HttpPageLoader`] fetches a page with `reqwest` and keeps only the text
//! of paragraph and heading elements (`p`, `h1`–`h6`), one block per element,
//! separated by blank lines so the splitter sees them as paragraphs.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

use crate::config::LoaderConfig;

/// Elements whose text is kept.
const TEXT_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6";

/// Fetches a page and returns its readable text.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &Url) -> Result<String>;
}

/// Loader backed by a plain HTTP GET.
pub struct HttpPageLoader {
    client: reqwest::Client,
}

impl HttpPageLoader {
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    async fn load(&self, url: &Url) -> Result<String> {
        tracing::debug!(%url, "fetching page");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {} fetching {}", status, url);
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("failed to read body of {}", url))?;
        extract_text_blocks(&html)
    }
}

/// Collect the whitespace-normalized text of paragraph and heading elements.
///
/// Blocks are returned in document order, joined by `\n\n`. Elements with
/// no visible text are skipped.
pub fn extract_text_blocks(html: &str) -> Result<String> {
    let selector = Selector::parse(TEXT_SELECTOR)
        .map_err(|e| anyhow::anyhow!("invalid selector {}: {}", TEXT_SELECTOR, e))?;
    let document = Html::parse_document(html);

    let blocks: Vec<String> = document
        .select(&selector)
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|block| !block.is_empty())
        .collect();

    Ok(blocks.join("\n\n"))
}
