//! HTTP response handlers.

use anyhow::Result;
use serde::Serialize;
use tiny_http::{Header, Request, Response, StatusCode};

pub const XML: &str = "application/xml; charset=utf-8";
pub const JSON: &str = "application/json; charset=utf-8";
pub const PLAIN: &str = "text/plain; charset=utf-8";

/// Respond with an XML document and the configured sitemap cache policy.
pub fn respond_xml(request: Request, body: String, cache_control: &str) -> Result<()> {
    let response = Response::from_string(body)
        .with_header(make_header("Content-Type", XML))
        .with_header(make_header("Cache-Control", cache_control));
    request.respond(response)?;
    Ok(())
}

/// Respond with a JSON payload.
pub fn respond_json<T: Serialize>(request: Request, value: &T) -> Result<()> {
    let body = serde_json::to_string(value)?;
    let response =
        Response::from_string(body).with_header(make_header("Content-Type", JSON));
    request.respond(response)?;
    Ok(())
}

/// Respond with a bare status code and plain-text message.
pub fn respond_status(request: Request, status: u16, message: &str) -> Result<()> {
    let response = Response::from_string(message)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", PLAIN));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Header {
    Header::from_bytes(key.as_bytes(), value.as_bytes()).unwrap()
}
