//! REST upload (wasm32)
//!
//! POSTs each record with `fetch` and returns immediately. The response is
//! handled on the browser event loop; failures land in a [`FailureSlot`]
//! that the session drains on its next check.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{FailureSlot, SessionPersister, SessionRecord};
use crate::error::PersistError;
use crate::sim::SessionSummary;

#[derive(Debug, Clone)]
pub struct RestPersister {
    endpoint: String,
    user_id: Option<String>,
    failures: FailureSlot,
}

impl RestPersister {
    pub fn new(endpoint: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_id,
            failures: FailureSlot::new(),
        }
    }

    /// Slot the background uploads report into
    pub fn failures(&self) -> &FailureSlot {
        &self.failures
    }

    fn build_request(&self, body: &str) -> Result<Request, PersistError> {
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_body(&wasm_bindgen::JsValue::from_str(body));

        let request = Request::new_with_str_and_init(&self.endpoint, &init).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;
        Ok(request)
    }
}

impl SessionPersister for RestPersister {
    fn persist(&mut self, summary: SessionSummary) -> Result<(), PersistError> {
        let body = SessionRecord::new(self.user_id.clone(), &summary).to_json()?;
        let request = self.build_request(&body)?;
        let window = web_sys::window().ok_or_else(|| PersistError::Storage("no window".into()))?;
        let promise = window.fetch_with_request(&request);

        let failures = self.failures.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match upload(promise).await {
                Ok(()) => log::info!("Session uploaded"),
                Err(e) => failures.record(e),
            }
        });
        Ok(())
    }

    fn take_deferred_error(&mut self) -> Option<PersistError> {
        self.failures.take()
    }
}

async fn upload(promise: js_sys::Promise) -> Result<(), PersistError> {
    let value = JsFuture::from(promise).await.map_err(js_err)?;
    let response: Response = value.dyn_into().map_err(js_err)?;
    if !response.ok() {
        return Err(PersistError::Rejected {
            status: response.status(),
        });
    }
    Ok(())
}

fn js_err(value: wasm_bindgen::JsValue) -> PersistError {
    PersistError::Storage(format!("{:?}", value))
}
