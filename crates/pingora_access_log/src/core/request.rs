use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Uri};
use serde_json::Value;

use crate::core::context::RequestContext;
use crate::error::{ContextError, ErrorType};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

pub struct Request {
    pub inner: http::Request<Bytes>,
    pub params: HashMap<String, String>,
    pub remote_addr: Option<SocketAddr>,
    context: Arc<RequestContext>,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", self.method())
            .field("uri", self.uri())
            .field("remote_addr", &self.remote_addr)
            .finish_non_exhaustive()
    }
}

impl Request {
    /// Build a request for `method` and `target` (path plus optional query).
    /// A target that does not parse as a URI falls back to `/`.
    pub fn new<M: Into<Method>, S: AsRef<str>>(method: M, target: S) -> Self {
        let mut inner = http::Request::new(Bytes::new());
        *inner.method_mut() = method.into();
        *inner.uri_mut() = target.as_ref().parse::<Uri>().unwrap_or_default();

        Self {
            inner,
            params: HashMap::new(),
            remote_addr: None,
            context: Arc::new(RequestContext::new()),
        }
    }

    pub fn header<K, V>(mut self, k: K, v: V) -> Self
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
    {
        if let (Ok(key), Ok(value)) = (k.try_into(), v.try_into()) {
            self.inner.headers_mut().insert(key, value);
        }
        self
    }

    pub fn with_body<B: Into<Bytes>>(mut self, body: B) -> Self {
        *self.inner.body_mut() = body.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Raw query string without the leading `?`; empty when absent.
    pub fn query_string(&self) -> &str {
        self.inner.uri().query().unwrap_or("")
    }

    /// `Host` header, falling back to the URI authority.
    pub fn host(&self) -> &str {
        self.headers()
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.uri().authority().map(|a| a.as_str()))
            .unwrap_or("")
    }

    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        self.inner.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap<HeaderValue> {
        self.inner.headers_mut()
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }

    /// Best guess at the originating client address.
    ///
    /// Order: first valid entry of `X-Forwarded-For`, then `X-Real-IP`, then
    /// the peer socket address. Empty when none is known.
    pub fn client_ip(&self) -> String {
        let forwarded = self
            .header_str(X_FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .and_then(parse_ip);
        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        if let Some(ip) = self.header_str(X_REAL_IP).and_then(parse_ip) {
            return ip.to_string();
        }

        self.remote_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default()
    }

    fn header_str(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn context(&self) -> Arc<RequestContext> {
        Arc::clone(&self.context)
    }

    pub fn set_key<K: Into<String>, V: Into<Value>>(&self, key: K, value: V) -> Option<Value> {
        self.context.set_key(key, value)
    }

    pub fn get_key(&self, key: &str) -> Option<Value> {
        self.context.get_key(key)
    }

    /// Record an error on the request without failing it.
    pub fn add_error<T: fmt::Display>(&self, err: T, kind: ErrorType) {
        self.context.add_error(ContextError::new(err, kind));
    }
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    raw.trim().parse().ok()
}
