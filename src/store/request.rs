//! Backend response envelope and the loading/error bookkeeping around calls.

use std::fmt::Display;

use bevy::log::warn;
use serde::Deserialize;

use super::AppStore;

const FALLBACK_ERROR: &str = "Request failed";

/// `{ "success": bool, ...payload, "error"?: string, "message"?: string }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            Ok(self.payload)
        } else {
            Err(self.error.or(self.message).unwrap_or_else(|| FALLBACK_ERROR.to_string()))
        }
    }
}

impl AppStore {
    /// Runs a collaborator call with `isLoading` set and `error` cleared.
    /// A failure is recorded in `error`; `isLoading` is cleared either way,
    /// including when the call panics.
    pub fn run_request<T, E: Display>(&mut self, call: impl FnOnce() -> Result<T, E>) -> Option<T> {
        self.set_loading(true);
        self.set_error(None);
        let mut scope = LoadingScope { store: self };
        match call() {
            Ok(value) => Some(value),
            Err(e) => {
                let message = e.to_string();
                warn!("Request failed: {}", message);
                scope.store.set_error(Some(message));
                None
            }
        }
    }
}

/// Clears `isLoading` when dropped.
struct LoadingScope<'a> {
    store: &'a mut AppStore,
}

impl Drop for LoadingScope<'_> {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}
