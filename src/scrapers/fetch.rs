//! HTTP fetching shared by the HTML adapters.
//!
//! Each adapter gets its own cookie-keeping [`reqwest::Client`] with a
//! browser-like header set and a per-request timeout. A [`FetchPlan`]
//! describes how many times the listing page has to be requested before
//! the body is usable; boards that set session cookies on a first visit
//! need two requests with a pause between them.

use super::AdapterError;
use crate::config::CrawlerConfig;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument};

/// Client identity and timeout applied to every adapter request.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
}

impl From<&CrawlerConfig> for HttpSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout(),
        }
    }
}

/// How to obtain a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub url: String,
    /// Total GETs issued against `url`; only the last body is kept.
    pub requests: usize,
    /// Pause before every request after the first.
    pub delay: Duration,
}

impl FetchPlan {
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            requests: 1,
            delay: Duration::ZERO,
        }
    }

    /// One warm-up request to collect cookies, `delay`, then the real one.
    pub fn warmed(url: impl Into<String>, delay: Duration) -> Self {
        Self {
            url: url.into(),
            requests: 2,
            delay,
        }
    }
}

/// Build a session client carrying the browser header set.
pub fn build_client(settings: &HttpSettings) -> Result<Client, AdapterError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    let client = Client::builder()
        .user_agent(settings.user_agent.as_str())
        .default_headers(headers)
        .cookie_store(true)
        .timeout(settings.timeout)
        .build()?;
    Ok(client)
}

/// Run `plan` with `client` and return the final response body.
///
/// Any non-2xx answer, including one to a warm-up request, aborts the
/// sequence.
#[instrument(level = "debug", skip_all, fields(url = %plan.url, requests = plan.requests))]
pub async fn fetch_page(client: &Client, plan: &FetchPlan) -> Result<String, AdapterError> {
    let mut body = String::new();
    for attempt in 0..plan.requests.max(1) {
        if attempt > 0 && !plan.delay.is_zero() {
            debug!(?plan.delay, "Pausing before follow-up request");
            sleep(plan.delay).await;
        }

        let response = client.get(&plan.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status,
                url: plan.url.clone(),
            });
        }
        body = response.text().await?;
        debug!(attempt, %status, bytes = body.len(), "Received response");
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_server;
    use axum::Router;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::get;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings() -> HttpSettings {
        HttpSettings {
            user_agent: "Mozilla/5.0 (test)".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_settings_from_config() {
        let config = CrawlerConfig {
            request_timeout_secs: 7,
            ..CrawlerConfig::default()
        };
        let http = HttpSettings::from(&config);
        assert_eq!(http.timeout, Duration::from_secs(7));
        assert_eq!(http.user_agent, config.user_agent);
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let app = Router::new().route(
            "/",
            get(|headers: AxumHeaders| async move {
                let ua = headers.get("user-agent").and_then(|v| v.to_str().ok());
                let lang = headers.get("accept-language");
                if ua == Some("Mozilla/5.0 (test)") && lang.is_some() {
                    (StatusCode::OK, "welcome")
                } else {
                    (StatusCode::FORBIDDEN, "bots go away")
                }
            }),
        );
        let addr = spawn_server(app).await;

        let client = build_client(&settings()).unwrap();
        let body = fetch_page(&client, &FetchPlan::single(format!("http://{addr}/")))
            .await
            .unwrap();
        assert_eq!(body, "welcome");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let app = Router::new().route("/", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }));
        let addr = spawn_server(app).await;

        let client = build_client(&settings()).unwrap();
        let err = fetch_page(&client, &FetchPlan::single(format!("http://{addr}/")))
            .await
            .unwrap_err();
        match err {
            AdapterError::Status { status, .. } => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_warmed_plan_reuses_session_cookie() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/",
            get(move |headers: AxumHeaders| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let has_session = headers
                        .get("cookie")
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|c| c.contains("session=warm"));
                    if has_session {
                        ([("set-cookie", "session=warm")], "content")
                    } else {
                        ([("set-cookie", "session=warm")], "challenge")
                    }
                }
            }),
        );
        let addr = spawn_server(app).await;

        let client = build_client(&settings()).unwrap();
        let plan = FetchPlan::warmed(format!("http://{addr}/"), Duration::from_millis(20));
        let body = fetch_page(&client, &plan).await.unwrap();
        assert_eq!(body, "content");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
