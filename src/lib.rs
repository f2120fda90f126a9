pub mod adapter;
pub mod api;
mod app;
mod components;
pub mod config;
pub mod models;
mod pages;
pub mod services;
pub mod session;
mod state;
pub mod storage;
pub mod telemetry;
pub mod token;

pub use app::App;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    telemetry::init();
    mount_to_body(App);
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::api::{ApiError, ApiRequest, ApiResponse, ApiResult, Method, Transport};
    use crate::session::Navigator;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Transport scripted per `(method, url)`. Unscripted routes answer 404
    /// with an empty body; a later script for the same route replaces the
    /// earlier one.
    #[derive(Default)]
    pub struct StubTransport {
        routes: Mutex<HashMap<(Method, String), ApiResult<ApiResponse>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, method: Method, url: &str, status: u16, body: Value) {
            self.routes
                .lock()
                .unwrap()
                .insert((method, url.to_string()), Ok(ApiResponse::new(status, body)));
        }

        pub fn fail(&self, method: Method, url: &str, error: ApiError) {
            self.routes
                .lock()
                .unwrap()
                .insert((method, url.to_string()), Err(error));
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn clear_requests(&self) {
            self.requests.lock().unwrap().clear();
        }
    }

    #[async_trait(?Send)]
    impl Transport for StubTransport {
        async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
            let key = (request.method.clone(), request.url.clone());
            self.requests.lock().unwrap().push(request);
            self.routes
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Ok(ApiResponse::new(404, Value::Null)))
        }
    }

    #[derive(Clone, Default)]
    pub struct RecordingNavigator {
        visits: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingNavigator {
        pub fn visits(&self) -> Vec<String> {
            self.visits.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visits.lock().unwrap().push(path.to_string());
        }
    }
}
