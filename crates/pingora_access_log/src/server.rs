//! Pingora session plumbing: turns a `ServerSession` into a [`Request`],
//! runs it through the [`App`], and streams the [`Response`] back.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use pingora::protocols::http::ServerSession;
use pingora::server::ShutdownWatch;
use pingora_core::apps::{
    HttpPersistentSettings, HttpServerApp, HttpServerOptions, ReusedHttpStream,
};
use pingora_http::ResponseHeader;

use crate::core::{Body, Method, Request, Response};
use crate::App;

const KEEPALIVE_SECS: u64 = 60;

#[async_trait]
impl HttpServerApp for App {
    async fn process_new_http(
        self: &Arc<Self>,
        mut http: ServerSession,
        shutdown: &ShutdownWatch,
    ) -> Option<ReusedHttpStream> {
        if !http.read_request().await.ok()? {
            return None;
        }
        let keepalive = if *shutdown.borrow() {
            None
        } else {
            Some(KEEPALIVE_SECS)
        };
        http.set_keepalive(keepalive);

        let req = read_request(&mut http).await;
        let is_head = *req.method() == Method::HEAD;
        let res = self.handle(req).await;

        if let Err(e) = write_response(&mut http, res, is_head).await {
            tracing::debug!(error = %e, "failed to write response");
            return None;
        }

        let persistent_settings = HttpPersistentSettings::for_session(&http);
        match http.finish().await {
            Ok(stream) => stream.map(|s| ReusedHttpStream::new(s, Some(persistent_settings))),
            Err(_) => None,
        }
    }

    fn h2_options(&self) -> Option<pingora::protocols::http::v2::server::H2Options> {
        None
    }

    fn server_options(&self) -> Option<&HttpServerOptions> {
        None
    }
}

/// Copy the request head, peer address and, when the headers announce one,
/// the body out of the session.
async fn read_request(http: &mut ServerSession) -> Request {
    let head = http.req_header();
    let target = String::from_utf8_lossy(head.raw_path()).into_owned();
    let mut req = Request::new(head.method.clone(), target);
    for (name, value) in head.headers.iter() {
        req.headers_mut().append(name.clone(), value.clone());
    }

    if let Some(addr) = http.client_addr().and_then(|addr| addr.as_inet()) {
        req = req.with_remote_addr(*addr);
    }

    if expects_body(&req)
        && let Ok(Some(body)) = http.read_request_body().await
    {
        req = req.with_body(body);
    }
    req
}

fn expects_body(req: &Request) -> bool {
    if *req.method() == Method::HEAD {
        return false;
    }
    let chunked = req.headers().contains_key(http::header::TRANSFER_ENCODING);
    let sized = req
        .headers()
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .is_some_and(|len| len > 0);
    chunked || sized
}

async fn write_response(
    http: &mut ServerSession,
    res: Response,
    is_head: bool,
) -> pingora_core::Result<()> {
    let mut header = ResponseHeader::build(res.status, Some(res.headers.len()))?;
    for (name, value) in res.headers.iter() {
        header.append_header(name.clone(), value.clone())?;
    }
    http.write_response_header(Box::new(header)).await?;

    if is_head {
        return Ok(());
    }

    match res.body {
        Body::Bytes(bytes) => http.write_response_body(bytes, true).await?,
        Body::Stream(mut chunks) => {
            while let Some(chunk) = chunks.next().await {
                http.write_response_body(chunk, false).await?;
            }
            http.write_response_body(Bytes::new(), true).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_is_read_only_when_announced() {
        assert!(!expects_body(&Request::new(Method::POST, "/")));
        assert!(expects_body(
            &Request::new(Method::POST, "/").header("content-length", "12")
        ));
        assert!(!expects_body(
            &Request::new(Method::POST, "/").header("content-length", "0")
        ));
        assert!(expects_body(
            &Request::new(Method::PUT, "/").header("transfer-encoding", "chunked")
        ));
        assert!(!expects_body(
            &Request::new(Method::HEAD, "/").header("content-length", "12")
        ));
    }
}
