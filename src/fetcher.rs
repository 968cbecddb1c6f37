use reqwest::blocking::Client;
use reqwest::redirect;
use tracing::debug;

use crate::config::Config;
use crate::error::{CatalogError, Result};

/// Anything that can turn a URL into a document body.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let max_redirects = config.max_redirects;
        let redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error(format!("Too many redirects (>{max_redirects})"))
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(redirect_policy)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| CatalogError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageSource for Fetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let resp = self.client.get(url).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Fetch(format!("HTTP {status}: {url}")));
        }

        Ok(resp.text()?)
    }
}
