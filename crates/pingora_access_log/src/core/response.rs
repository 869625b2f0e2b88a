use bytes::Bytes;
use futures::stream::BoxStream;
use http::{HeaderMap, HeaderValue, StatusCode};

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

pub enum Body {
    Bytes(Bytes),
    Stream(BoxStream<'static, Bytes>),
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::Bytes(Bytes::new()),
        }
    }

    /// Empty body, no content-type.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status)
    }

    pub fn text<S: Into<String>>(status: StatusCode, body: S) -> Self {
        let body: String = body.into();
        let mut res = Self::bytes(status, body);
        res.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        res
    }

    /// Raw bytes, no content-type.
    pub fn bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let mut res = Self::new(status);
        res.body = Body::Bytes(body.into());
        res
    }

    /// Serialize `value` as JSON. Serialization failure yields an empty 500.
    pub fn json(status: StatusCode, value: impl serde::Serialize) -> Self {
        let mut res = match serde_json::to_vec(&value) {
            Ok(bytes) => Self::bytes(status, bytes),
            Err(_) => Self::empty(StatusCode::INTERNAL_SERVER_ERROR),
        };
        res.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        res
    }

    pub fn stream(status: StatusCode, stream: BoxStream<'static, Bytes>) -> Self {
        let mut res = Self::new(status);
        res.body = Body::Stream(stream);
        res
    }

    pub fn set_header<K, V>(&mut self, k: K, v: V)
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
    {
        if let (Ok(key), Ok(value)) = (k.try_into(), v.try_into()) {
            self.headers.insert(key, value);
        }
    }

    pub fn header<K, V>(mut self, k: K, v: V) -> Self
    where
        K: TryInto<http::HeaderName>,
        V: TryInto<HeaderValue>,
    {
        self.set_header(k, v);
        self
    }

    /// Size of the response body in bytes.
    ///
    /// Streams are sized by their `content-length` header when one is set
    /// and count as zero otherwise.
    pub fn body_size(&self) -> usize {
        match &self.body {
            Body::Bytes(bytes) => bytes.len(),
            Body::Stream(_) => self
                .headers
                .get(http::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[test]
    fn json_sets_content_type_and_body() {
        let v = json!({"a": 1, "b": "x"});
        let res = Response::json(StatusCode::CREATED, &v);
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(
            res.headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(res.body_size(), serde_json::to_vec(&v).unwrap().len());
    }

    #[test]
    fn constructors_leave_length_headers_to_the_app() {
        let res = Response::text(StatusCode::OK, "hello world");
        assert_eq!(res.body_size(), 11);
        assert!(!res.headers.contains_key(http::header::CONTENT_LENGTH));

        let res = Response::empty(StatusCode::NO_CONTENT);
        assert_eq!(res.body_size(), 0);
        assert!(!res.headers.contains_key(http::header::CONTENT_TYPE));
    }

    #[test]
    fn stream_size_comes_from_content_length() {
        let chunks = futures::stream::iter(vec![Bytes::from_static(b"abc")]);
        let res = Response::stream(StatusCode::OK, chunks.boxed());
        assert_eq!(res.body_size(), 0);

        let chunks = futures::stream::iter(vec![Bytes::from_static(b"abc")]);
        let res = Response::stream(StatusCode::OK, chunks.boxed()).header("content-length", "3");
        assert_eq!(res.body_size(), 3);
    }
}
