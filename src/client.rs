// src/client.rs

use crate::{config::AppConfig, constants, error::*};
use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use reqwest::{IntoUrl, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::sync::Arc;
use url::Url;

/// One fetched response with the body fully read into memory.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub final_url: Url,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Fetched {
    pub fn is_html(&self) -> bool {
        let ct = self.content_type.split(';').next().unwrap_or("").trim();
        ct.eq_ignore_ascii_case("text/html") || ct.eq_ignore_ascii_case("application/xhtml+xml")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[derive(Clone)]
pub struct PageClient {
    pub client: ClientWithMiddleware,
    config: Arc<AppConfig>,
}

impl PageClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let mut headers = HeaderMap::new();
        if let Some(session) = &config.session {
            let cookie = format!("{}={}", constants::SESSION_COOKIE_NAME, session);
            let value = HeaderValue::from_str(&cookie).map_err(|_| {
                AppError::UserInputError(
                    "The session cookie contains characters that cannot be sent in a header"
                        .to_string(),
                )
            })?;
            headers.insert(COOKIE, value);
        }
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .connect_timeout(config.connect_timeout)
                .timeout(config.timeout)
                .default_headers(headers)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self { client, config })
    }

    fn session_error(&self) -> AppError {
        if self.config.session.is_some() {
            AppError::SessionInvalid
        } else {
            AppError::SessionMissing
        }
    }

    /// GET with auth checks. Moodle answers an expired session with a 200
    /// redirect to the login page, so the final URL is checked too.
    pub async fn get<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        let res = self.client.get(url).send().await?;
        if res.status() == StatusCode::UNAUTHORIZED || res.status() == StatusCode::FORBIDDEN {
            return Err(self.session_error());
        }
        if res.url().path().contains("/login/") {
            return Err(self.session_error());
        }
        if !res.status().is_success() {
            return Err(AppError::Http {
                url: res.url().to_string(),
                status: res.status().as_u16(),
            });
        }
        Ok(res)
    }

    /// GET and read the whole body, enforcing the configured size cap both
    /// up front (Content-Length) and while streaming.
    pub async fn fetch<T: IntoUrl>(&self, url: T) -> AppResult<Fetched> {
        let res = self.get(url).await?;
        let final_url = res.url().clone();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let limit = self.config.max_fetch_bytes;
        if let Some(len) = res.content_length() {
            if len > limit {
                return Err(AppError::BodyTooLarge { url: final_url.to_string(), limit });
            }
        }
        let mut bytes = Vec::new();
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if bytes.len() as u64 + chunk.len() as u64 > limit {
                return Err(AppError::BodyTooLarge { url: final_url.to_string(), limit });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(Fetched { final_url, content_type, bytes })
    }
}
