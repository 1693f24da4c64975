//! Core HTTP operations with client-side rate limiting
//!
//! Every request goes through a `governor` rate limiter before it is sent.
//! Failed requests are reported once; there is no retry loop, the user
//! re-triggering the action is the only recovery path.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{ApiError, ApiResult};

type DirectRateLimiter = RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>;

/// HTTP operations handler
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: DirectRateLimiter,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRateLimit` if `rate_limit_rps` is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> ApiResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(rate_limit_rps: u32) -> ApiResult<DirectRateLimiter> {
        let rps = NonZeroU32::new(rate_limit_rps).ok_or(ApiError::InvalidRateLimit)?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    /// Fetches `url` and decodes the JSON body
    ///
    /// An empty body is decoded as `{}` since TheMealDB answers some
    /// unknown filter values with nothing at all.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status or a body
    /// that does not decode into `T`
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> ApiResult<T> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Request to {} failed with HTTP {}", url.path(), status);
            return Err(ApiError::ServerError {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &body
        };

        let decoded = serde_json::from_slice(body).map_err(|e| ApiError::Decode {
            endpoint: url.path().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!("Fetched {}", url);
        Ok(decoded)
    }
}
