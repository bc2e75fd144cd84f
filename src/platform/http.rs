//! Fetch-based client for the auth and game-state services (WASM only)

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::api::{
    ApiError, AuthMode, CredentialsPayload, Endpoint, authorization, interpret_ack_response,
    interpret_auth_response, interpret_state_response,
};
use crate::persistence::{Snapshot, SyncRequest, SyncResult};

fn js_err(err: JsValue) -> ApiError {
    ApiError::Network(
        err.as_string()
            .unwrap_or_else(|| format!("{:?}", err)),
    )
}

/// HTTP client bound to one service base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Send one request, returning status and body text
    async fn send(
        &self,
        endpoint: Endpoint,
        token: Option<&str>,
        body: Option<String>,
    ) -> Result<(u16, String), ApiError> {
        let auth = authorization(endpoint, token)?;
        let headers = Headers::new().map_err(js_err)?;
        if body.is_some() {
            headers
                .set("Content-Type", "application/json")
                .map_err(js_err)?;
        }
        if let Some(value) = &auth {
            headers.set("Authorization", value).map_err(js_err)?;
        }

        let init = RequestInit::new();
        init.set_method(endpoint.method().as_str());
        init.set_mode(RequestMode::Cors);
        init.set_headers(&headers);
        if let Some(body) = &body {
            init.set_body(&JsValue::from_str(body));
        }

        let url = endpoint.url(&self.base_url);
        let request = Request::new_with_str_and_init(&url, &init).map_err(js_err)?;
        let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;

        log::debug!("{} {}", endpoint.method().as_str(), url);
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;
        let status = response.status();
        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        Ok((status, text.as_string().unwrap_or_default()))
    }

    pub async fn fetch_state(&self, token: &str) -> Result<Option<Snapshot>, ApiError> {
        let (status, body) = self.send(Endpoint::FetchState, Some(token), None).await?;
        interpret_state_response(status, &body)
    }

    pub async fn save_state(&self, token: &str, snapshot: &Snapshot) -> Result<(), ApiError> {
        let body = serde_json::to_string(snapshot)?;
        let (status, _) = self.send(Endpoint::SaveState, Some(token), Some(body)).await?;
        interpret_ack_response(status)
    }

    pub async fn reset_state(&self, token: &str) -> Result<(), ApiError> {
        let (status, _) = self
            .send(Endpoint::ResetState, Some(token), Some("{}".to_string()))
            .await?;
        interpret_ack_response(status)
    }

    /// Log in or register, returning the issued token
    pub async fn authenticate(
        &self,
        mode: AuthMode,
        payload: &CredentialsPayload,
    ) -> Result<String, ApiError> {
        let body = serde_json::to_string(payload)?;
        let (status, text) = self.send(mode.endpoint(), None, Some(body)).await?;
        interpret_auth_response(mode, status, &text)
    }

    /// Run a queued sync request to completion
    pub async fn execute(&self, request: SyncRequest) -> SyncResult {
        match request {
            SyncRequest::Pull { generation, token } => SyncResult::Pulled {
                generation,
                result: self.fetch_state(&token).await,
            },
            SyncRequest::Push {
                token, snapshot, ..
            } => SyncResult::Pushed(self.save_state(&token, &snapshot).await),
            SyncRequest::Reset { token } => SyncResult::Reset(self.reset_state(&token).await),
        }
    }
}
