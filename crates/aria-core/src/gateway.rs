//! Request gateway — the single choke point for outbound AJAX calls.
//!
//! Attaches the action name and nonce, URL-encodes the form body, and
//! normalizes every failure mode (missing nonce, transport error, non-2xx
//! status, unparseable JSON) into a `{ success: false }` envelope. Callers
//! never see an error and never crash the UI on network failure.

use std::rc::Rc;

use aria_types::config::HostConfig;
use aria_types::strings::UiStrings;
use aria_types::wire::AjaxResponse;

use crate::ports::TransportPort;

pub struct RequestGateway {
    ajax_url: String,
    nonce: Option<String>,
    strings: UiStrings,
    transport: Rc<dyn TransportPort>,
}

impl RequestGateway {
    pub fn new(host: &HostConfig, transport: Rc<dyn TransportPort>) -> Self {
        Self {
            ajax_url: host.ajax_url.clone(),
            nonce: host.nonce.clone().filter(|n| !n.is_empty()),
            strings: host.strings.clone(),
            transport,
        }
    }

    /// POST `action` with the given fields. Infallible by contract.
    ///
    /// A missing nonce is a fatal precondition: the transport is never
    /// invoked and the caller gets a synthetic failure telling the visitor
    /// to refresh (the token is page-load-scoped, so only a reload helps).
    pub async fn send(&self, action: &str, fields: &[(&str, &str)]) -> AjaxResponse {
        let nonce = match &self.nonce {
            Some(n) => n.as_str(),
            None => {
                log::warn!("{}: no nonce configured, request not sent", action);
                return AjaxResponse::failure(&self.strings.error_session_expired);
            }
        };

        let mut pairs: Vec<(&str, &str)> = vec![("action", action), ("nonce", nonce)];
        pairs.extend_from_slice(fields);
        let body = encode_form(&pairs);

        let (status, text) = match self.transport.post_form(&self.ajax_url, &body).await {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("{}: transport error: {}", action, e);
                return AjaxResponse::failure(&self.strings.error_connection);
            }
        };

        if !(200..300).contains(&status) {
            log::error!("{}: HTTP {}", action, status);
            return AjaxResponse::failure(&self.strings.error_connection);
        }

        match serde_json::from_str::<AjaxResponse>(&text) {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("{}: malformed response: {}", action, e);
                AjaxResponse::failure(&self.strings.error_connection)
            }
        }
    }
}

/// Percent-encode key/value pairs into an `application/x-www-form-urlencoded`
/// body. Pure, so the wire shape is testable without a browser.
pub fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
