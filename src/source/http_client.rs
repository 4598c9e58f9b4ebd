use crate::config::SourceConfig;
use crate::source::SourceError;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

/// Thin reqwest wrapper: one attempt per request, preceded by a polite delay.
pub struct HttpClient {
    inner: reqwest::Client,
    config: SourceConfig,
}

impl HttpClient {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    /// Fetch a URL as text.
    pub async fn get_text(&self, url: &Url) -> Result<String, SourceError> {
        self.polite_delay().await;
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        check_status(resp.status(), url)?;
        Ok(resp.text().await?)
    }

    /// Sleep for the configured delay + random jitter.
    async fn polite_delay(&self) {
        let jitter = rand::random::<u64>() % (self.config.jitter_ms + 1);
        let total = Duration::from_millis(self.config.request_delay_ms + jitter);
        if !total.is_zero() {
            sleep(total).await;
        }
    }
}

/// 404 means the source has no data for the request; any other non-2xx
/// status is a failed request.
pub fn check_status(status: StatusCode, url: &Url) -> Result<(), SourceError> {
    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NoData);
    }
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}
