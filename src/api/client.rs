//! Fetch-based API client (wasm32 only).
//!
//! Thin wrapper over `window.fetch` that attaches the session's bearer
//! token and an abort signal. The client owns one `AbortController`;
//! dropping the client aborts everything still in flight, so a view torn
//! down mid-request never receives a late response.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, Response};

use super::session::Session;
use crate::error::{Result, SyncviewError};
use crate::types::{KpiDefinition, RecordSet, SyncJob};

pub struct ApiClient {
    session: Session,
    abort: AbortController,
}

impl ApiClient {
    /// Client over an authenticated session.
    pub fn new(session: Session) -> Result<Self> {
        let abort = AbortController::new()
            .map_err(|_| SyncviewError::Api("AbortController unavailable".to_string()))?;
        Ok(Self { session, abort })
    }

    /// Abort all in-flight requests issued through this client.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Fetch a record set for a grid view (`/api/classifications/records`,
    /// `/api/assets/records`, ...).
    pub async fn fetch_records(&self, path: &str) -> Result<RecordSet> {
        let value = self.request("GET", path, None).await?;
        decode(value, path)
    }

    /// Fetch a sync job snapshot.
    pub async fn fetch_job(&self, job_id: &str) -> Result<SyncJob> {
        let path = format!("/api/sync/jobs/{job_id}");
        let value = self.request("GET", &path, None).await?;
        decode(value, &path)
    }

    /// List saved KPI definitions.
    pub async fn list_kpis(&self) -> Result<Vec<KpiDefinition>> {
        let value = self.request("GET", "/api/kpis", None).await?;
        decode(value, "/api/kpis")
    }

    /// Persist a KPI definition. The caller is responsible for having
    /// validated the formula first; the backend re-validates regardless.
    pub async fn save_kpi(&self, kpi: &KpiDefinition) -> Result<()> {
        let body = serde_json::to_string(kpi)?;
        self.request("POST", "/api/kpis", Some(body)).await?;
        Ok(())
    }

    async fn request(&self, method: &str, path: &str, body: Option<String>) -> Result<JsValue> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_signal(Some(&self.abort.signal()));
        let has_body = body.is_some();
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }

        let url = self.session.url_for(path);
        let request = Request::new_with_str_and_init(&url, &opts)
            .map_err(|e| SyncviewError::Api(js_message(&e, "building request")))?;

        let headers = request.headers();
        set_header(&headers, "Accept", "application/json")?;
        if has_body {
            set_header(&headers, "Content-Type", "application/json")?;
        }
        set_header(&headers, "Authorization", &self.session.authorization()?)?;

        let window = web_sys::window()
            .ok_or_else(|| SyncviewError::Api("no window object".to_string()))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| SyncviewError::Api(js_message(&e, path)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| SyncviewError::Api("fetch returned a non-Response".to_string()))?;

        if !response.ok() {
            return Err(SyncviewError::Api(format!(
                "HTTP {} for {path}",
                response.status()
            )));
        }

        let json = response
            .json()
            .map_err(|e| SyncviewError::Api(js_message(&e, path)))?;
        JsFuture::from(json)
            .await
            .map_err(|e| SyncviewError::Api(js_message(&e, path)))
    }
}

impl Drop for ApiClient {
    fn drop(&mut self) {
        // Teardown cancels in-flight work; a late response must not
        // resolve into a component that no longer exists.
        self.abort.abort();
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: JsValue, path: &str) -> Result<T> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| SyncviewError::Api(format!("decoding {path}: {e}")))
}

fn set_header(headers: &web_sys::Headers, name: &str, value: &str) -> Result<()> {
    headers
        .set(name, value)
        .map_err(|e| SyncviewError::Api(js_message(&e, name)))
}

fn js_message(value: &JsValue, context: &str) -> String {
    let text = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "unknown error".to_string());
    format!("{context}: {text}")
}
