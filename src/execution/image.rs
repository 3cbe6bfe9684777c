//! Image locator - builds an illustrative image URL for a topic
//!
//! No request is made here; the URL is rendered by the image service when
//! the article is displayed.

use crate::core::{config::ImageConfig, ConfigError};
use rand::Rng;
use reqwest::Url;
use std::ops::RangeInclusive;

/// Seeds are drawn uniformly from this range
pub const SEED_RANGE: RangeInclusive<u32> = 1..=99_999;

/// Builds seeded image URLs from a template
#[derive(Debug, Clone)]
pub struct ImageLocator {
    config: ImageConfig,
}

impl ImageLocator {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Build an image URL for `topic` with a fresh random seed
    pub fn locate(&self, topic: &str) -> Result<String, ConfigError> {
        let seed = rand::rng().random_range(SEED_RANGE);
        self.locate_with_seed(topic, seed)
    }

    /// Build an image URL for `topic` with the given seed
    ///
    /// The description becomes the last path segment of `base_url`.
    pub fn locate_with_seed(&self, topic: &str, seed: u32) -> Result<String, ConfigError> {
        let description = format!(
            "editorial news photo of {}, dramatic lighting, highly detailed, 8k, \
             cinematic depth of field, professional photography",
            topic.trim()
        );

        let mut url = parse_base(&self.config.base_url)?;
        url.path_segments_mut()
            .map_err(|_| invalid_base(&self.config.base_url))?
            .pop_if_empty()
            .push(&description);
        url.query_pairs_mut()
            .append_pair("width", &self.config.width.to_string())
            .append_pair("height", &self.config.height.to_string())
            .append_pair("nologo", "true")
            .append_pair("private", "true")
            .append_pair("enhance", "true")
            .append_pair("seed", &seed.to_string());

        Ok(url.into())
    }
}

impl Default for ImageLocator {
    fn default() -> Self {
        Self::new(ImageConfig::default())
    }
}

fn invalid_base(base_url: &str) -> ConfigError {
    ConfigError::Invalid(format!("image.base_url cannot take a path: {}", base_url))
}

/// Parse an image service base URL, rejecting ones that cannot hold a path
pub fn parse_base(base_url: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::Invalid(format!("image.base_url '{}': {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(invalid_base(base_url));
    }
    Ok(url)
}

/// Pull the seed back out of a located URL
pub fn seed_of(url: &str) -> Option<u32> {
    Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "seed")?
        .1
        .parse()
        .ok()
}
