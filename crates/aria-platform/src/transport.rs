//! HTTP transport using browser `fetch()` via gloo-net.

use async_trait::async_trait;
use gloo_net::http::Request;

use aria_core::ports::TransportPort;
use aria_types::{Result, WidgetError};

pub struct FetchTransport;

#[async_trait(?Send)]
impl TransportPort for FetchTransport {
    async fn post_form(&self, url: &str, body: &str) -> Result<(u16, String)> {
        let response = Request::post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .map_err(|e| WidgetError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WidgetError::Network(e.to_string()))?;

        Ok((status, text))
    }
}
