//! HTTP responses.
//!
//! Handlers build a [`Reply`]; `send` turns it into a `tiny_http` response
//! carrying the CORS and no-cache headers every response gets.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tiny_http::{Header, Request, Response, StatusCode};

use crate::embed::MessageVars;
use crate::embed::serve::{
    FORBIDDEN_HTML, METHOD_NOT_ALLOWED_HTML, NOT_FOUND_HTML, NotFoundVars, SERVER_ERROR_HTML,
};
use crate::utils::mime::{self, types};
use crate::{debug, log};

/// Headers sent with every response.
const COMMON_HEADERS: [(&str, &str); 6] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Cache-Control", "no-cache, no-store, must-revalidate"),
    ("Pragma", "no-cache"),
    ("Expires", "0"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: Some(types::HTML),
            body: body.into_bytes(),
        }
    }

    /// Preflight answer.
    pub fn empty() -> Self {
        Self {
            status: 200,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// The file at `path`. JSON files must parse, or the reply is a 500.
    pub fn file(path: &Path) -> Self {
        let body = match fs::read(path) {
            Ok(body) => body,
            Err(e) => {
                log!("serve"; "failed to read {}: {}", path.display(), e);
                return Self::server_error(&format!("文件读取失败: {e}"));
            }
        };

        let content_type = mime::from_path(path);
        if content_type == types::JSON {
            if let Err(e) = serde_json::from_slice::<serde::de::IgnoredAny>(&body) {
                log!("serve"; "invalid JSON in {}: {}", path.display(), e);
                return Self::server_error(&format!("JSON文件格式错误: {e}"));
            }
        }

        debug!("serve"; "sent {}", path.display());
        Self {
            status: 200,
            content_type: Some(content_type),
            body,
        }
    }

    pub fn forbidden() -> Self {
        Self::html(403, FORBIDDEN_HTML.render(&()))
    }

    pub fn not_found(request_path: &str) -> Self {
        Self::html(
            404,
            NOT_FOUND_HTML.render(&NotFoundVars {
                path: request_path.to_string(),
            }),
        )
    }

    pub fn method_not_allowed() -> Self {
        Self::html(405, METHOD_NOT_ALLOWED_HTML.render(&()))
    }

    pub fn server_error(message: &str) -> Self {
        Self::html(
            500,
            SERVER_ERROR_HTML.render(&MessageVars {
                message: message.to_string(),
            }),
        )
    }

    /// Sent once Ctrl+C has been pressed.
    pub fn unavailable() -> Self {
        Self {
            status: 503,
            content_type: Some(types::PLAIN),
            body: b"server is shutting down".to_vec(),
        }
    }

    /// Header name/value pairs of this reply.
    pub fn header_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::with_capacity(COMMON_HEADERS.len() + 1);
        if let Some(content_type) = self.content_type {
            pairs.push(("Content-Type", content_type));
        }
        pairs.extend(COMMON_HEADERS);
        pairs
    }

    pub fn send(self, request: Request) -> Result<()> {
        let headers: Vec<Header> = self
            .header_pairs()
            .into_iter()
            .filter_map(|(name, value)| Header::from_bytes(name, value).ok())
            .collect();

        let mut response = Response::from_data(self.body).with_status_code(StatusCode(self.status));
        for header in headers {
            response.add_header(header);
        }
        request.respond(response)?;
        Ok(())
    }
}
