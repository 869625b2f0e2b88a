use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use serde_json::Value;

use crate::error::{ContextError, ErrorChain, ErrorType};

/// State shared by every layer that sees one request.
///
/// Middleware hands the request down the chain by value, so anything a
/// handler wants outer layers to observe after it returns (diagnostic keys,
/// recorded errors) lives here behind an `Arc`.
#[derive(Debug, Default)]
pub struct RequestContext {
    keys: RwLock<HashMap<String, Value>>,
    errors: Mutex<ErrorChain>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key<K: Into<String>, V: Into<Value>>(&self, key: K, value: V) -> Option<Value> {
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into())
    }

    pub fn get_key(&self, key: &str) -> Option<Value> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Snapshot of every key set so far.
    pub fn keys(&self) -> HashMap<String, Value> {
        self.keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn add_error(&self, err: ContextError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err);
    }

    pub fn errors(&self) -> ErrorChain {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors_by_type(&self, kind: ErrorType) -> ErrorChain {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_type(kind)
    }
}
