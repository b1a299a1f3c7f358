//! Affiliate link issuance
//!
//! Turns (product, platform) into an outbound affiliate URL with the
//! tracking token attached, and records the issued link so a later webhook
//! can join back to the originating click.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use url::Url;

use crate::config::LinksConfig;
use crate::errors::{AfftrackError, Result};
use crate::storage::{AffiliateLink, SeaOrmStorage};
use crate::utils::{generate_prefixed_id, id_prefix};

/// Builds the outbound destination URL for a platform.
///
/// Async because real deeplink APIs (eBay Partner Network, AliExpress
/// Portals) are remote calls; the template client resolves locally.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn destination_url(&self, platform: &str, product_id: &str) -> Result<Url>;
}

/// Template-based destination builder. Each platform maps to a URL template
/// with a `{product_id}` placeholder; unknown platforms use the fallback.
pub struct UrlTemplateClient {
    templates: HashMap<String, String>,
    fallback: String,
}

impl UrlTemplateClient {
    pub fn new(templates: HashMap<String, String>, fallback: String) -> Self {
        Self {
            templates,
            fallback,
        }
    }

    pub fn from_config(config: &LinksConfig) -> Self {
        Self::new(config.templates.clone(), config.fallback_template.clone())
    }
}

#[async_trait]
impl PlatformClient for UrlTemplateClient {
    async fn destination_url(&self, platform: &str, product_id: &str) -> Result<Url> {
        let template = self
            .templates
            .get(&platform.to_lowercase())
            .unwrap_or(&self.fallback);

        let rendered = template.replace("{product_id}", product_id);
        Url::parse(&rendered).map_err(|e| {
            AfftrackError::validation(format!(
                "Link template for '{}' produced an invalid URL: {}",
                platform, e
            ))
        })
    }
}

/// An issued affiliate link, ready to hand back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedLink {
    pub link_id: String,
    pub affiliate_url: String,
}

/// Issues affiliate links and persists the link record
pub struct LinkIssuer {
    storage: Arc<SeaOrmStorage>,
    client: Arc<dyn PlatformClient>,
}

impl LinkIssuer {
    pub fn new(storage: Arc<SeaOrmStorage>, client: Arc<dyn PlatformClient>) -> Self {
        Self { storage, client }
    }

    /// Issue an affiliate link for a product.
    ///
    /// When a click id is supplied it is attached as the `clk` query
    /// parameter so the platform echoes it back in conversion webhooks. A
    /// click id that does not resolve is kept on the link anyway; the click
    /// may land in storage after the link request under concurrent traffic.
    pub async fn issue_link(
        &self,
        product_id: &str,
        platform: &str,
        click_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<IssuedLink> {
        if product_id.is_empty() {
            return Err(AfftrackError::validation("productId must not be empty"));
        }
        if platform.is_empty() {
            return Err(AfftrackError::validation("platform must not be empty"));
        }

        let mut destination = self.client.destination_url(platform, product_id).await?;

        if let Some(click_id) = click_id {
            match self.storage.get_click(click_id).await? {
                Some(_) => debug!("Link references click {}", click_id),
                None => warn!(
                    "Link issued for unknown click {}; attribution may not resolve",
                    click_id
                ),
            }
            destination
                .query_pairs_mut()
                .append_pair("clk", click_id);
        }

        let link = AffiliateLink {
            id: generate_prefixed_id(id_prefix::LINK),
            product_id: product_id.to_string(),
            platform: platform.to_string(),
            user_id: user_id.map(str::to_string),
            click_id: click_id.map(str::to_string),
            destination_url: destination.to_string(),
            created_at: Utc::now(),
        };

        self.storage.insert_link(&link).await?;

        Ok(IssuedLink {
            link_id: link.id,
            affiliate_url: link.destination_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UrlTemplateClient {
        UrlTemplateClient::from_config(&LinksConfig::default())
    }

    #[tokio::test]
    async fn template_substitutes_product_id() {
        let url = client()
            .destination_url("amazon", "B0EXAMPLE")
            .await
            .unwrap();
        assert_eq!(url.host_str(), Some("www.amazon.com"));
        assert!(url.path().contains("B0EXAMPLE"));
    }

    #[tokio::test]
    async fn unknown_platform_uses_fallback() {
        let url = client()
            .destination_url("walmart", "SKU-12")
            .await
            .unwrap();
        assert_eq!(url.host_str(), Some("out.afftrack.dev"));
        assert!(url.path().contains("SKU-12"));
    }
}
