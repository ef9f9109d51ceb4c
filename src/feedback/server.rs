//! Feedback HTTP server
//!
//! Requests are handled one at a time on the calling thread. Routing lives
//! in [`FeedbackService::handle`], which works on plain strings so it can
//! be exercised without a socket.

use std::io::Read;

use chrono::Utc;
use serde_json::{json, Value};
use tiny_http::{Header, Request, Response, Server};
use tracing::{error, info, warn};

use super::store::FeedbackStore;
use super::validate::Submission;
use super::FeedbackError;

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 3000;

/// Request bodies beyond this are rejected with 413
const MAX_BODY: u64 = 64 * 1024;

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// A routed response: status plus optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let content_type = self
            .body_is_json()
            .then_some(("Content-Type", "application/json"));
        let body = self.body.map(|b| b.to_string()).unwrap_or_default();
        let mut response = Response::from_data(body.into_bytes()).with_status_code(self.status);
        for (name, value) in CORS_HEADERS.iter().copied().chain(content_type) {
            if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                response.add_header(header);
            }
        }
        response
    }

    fn body_is_json(&self) -> bool {
        self.status != 204
    }
}

/// Request router over a store
#[derive(Debug, Clone)]
pub struct FeedbackService {
    store: FeedbackStore,
}

impl FeedbackService {
    pub fn new(store: FeedbackStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &FeedbackStore {
        &self.store
    }

    /// Route one request
    pub fn handle(&self, method: &str, url: &str, body: &str) -> Reply {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        match (method, path) {
            ("OPTIONS", _) => Reply::empty(204),
            ("POST", "/api/feedback") => self.submit(body),
            ("GET", "/api/feedback-count") => match self.store.count() {
                Ok(count) => Reply::json(200, json!({ "count": count })),
                Err(e) => {
                    error!(error = %e, "reading feedback count failed");
                    Reply::json(500, json!({ "error": format!("Failed to get feedback count: {e}") }))
                }
            },
            ("GET", "/api/feedback-stats") => match self.store.stats(Utc::now()) {
                Ok(stats) => Reply::json(200, json!(stats)),
                Err(e) => {
                    error!(error = %e, "reading feedback stats failed");
                    Reply::json(500, json!({ "error": format!("Failed to get feedback stats: {e}") }))
                }
            },
            _ => Reply::json(404, json!({ "error": "Not found" })),
        }
    }

    fn submit(&self, body: &str) -> Reply {
        let submission: Submission = match serde_json::from_str(body) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "malformed feedback body");
                return failure(400, format!("Invalid request body: {e}"));
            }
        };
        match self.store.append(&submission) {
            Ok(entry) => {
                info!(id = entry.id, "feedback stored");
                Reply::json(
                    200,
                    json!({ "success": true, "message": "Feedback submitted successfully" }),
                )
            }
            Err(FeedbackError::Invalid(e)) => failure(400, e.to_string()),
            Err(e) => {
                error!(error = %e, "storing feedback failed");
                failure(500, format!("Error submitting feedback: {e}"))
            }
        }
    }

    /// Bind `addr` and serve until the listener fails
    pub fn serve(&self, addr: &str) -> Result<(), FeedbackError> {
        let server = Server::http(addr).map_err(|e| FeedbackError::Server(e.to_string()))?;
        info!(%addr, "feedback server listening");
        for request in server.incoming_requests() {
            self.respond(request);
        }
        Ok(())
    }

    fn respond(&self, mut request: Request) {
        let method = request.method().as_str().to_string();
        let url = request.url().to_string();
        let reply = match read_body(request.as_reader()) {
            Ok(body) => self.handle(&method, &url, &body),
            Err(reply) => reply,
        };
        info!(%method, %url, status = reply.status, "request");
        if let Err(e) = request.respond(reply.into_response()) {
            warn!(error = %e, "writing response failed");
        }
    }
}

/// Read a whole request body as UTF-8, at most [`MAX_BODY`] bytes.
///
/// Failures come back as the reply to send instead of routing.
fn read_body<R: Read>(reader: R) -> Result<String, Reply> {
    let mut bytes = Vec::new();
    if let Err(e) = reader.take(MAX_BODY + 1).read_to_end(&mut bytes) {
        warn!(error = %e, "reading request body failed");
        return Err(failure(400, format!("Invalid request body: {e}")));
    }
    if bytes.len() as u64 > MAX_BODY {
        warn!(limit = MAX_BODY, "request body too large");
        return Err(failure(413, "Request body too large".to_string()));
    }
    String::from_utf8(bytes).map_err(|e| {
        warn!(error = %e, "request body is not UTF-8");
        failure(400, format!("Invalid request body: {e}"))
    })
}

fn failure(status: u16, message: String) -> Reply {
    Reply::json(status, json!({ "success": false, "message": message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (FeedbackService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::open(dir.path().join("feedback.json")).unwrap();
        (FeedbackService::new(store), dir)
    }

    #[test]
    fn test_options_preflight() {
        let (svc, _dir) = service();
        assert_eq!(svc.handle("OPTIONS", "/api/feedback", ""), Reply::empty(204));
    }

    #[test]
    fn test_unknown_route() {
        let (svc, _dir) = service();
        assert_eq!(svc.handle("GET", "/nope", "").status, 404);
        assert_eq!(svc.handle("DELETE", "/api/feedback", "").status, 404);
    }

    #[test]
    fn test_query_string_ignored() {
        let (svc, _dir) = service();
        let reply = svc.handle("GET", "/api/feedback-count?x=1", "");
        assert_eq!(reply, Reply::json(200, json!({ "count": 0 })));
    }

    #[test]
    fn test_malformed_body() {
        let (svc, _dir) = service();
        let reply = svc.handle("POST", "/api/feedback", "{not json");
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body.unwrap()["success"], json!(false));
    }

    #[test]
    fn test_response_headers() {
        let response = Reply::json(200, json!({})).into_response();
        let headers = response.headers();
        assert!(headers.iter().any(|h| h.field.equiv("Access-Control-Allow-Origin")));
        let content_types: Vec<_> = headers.iter().filter(|h| h.field.equiv("Content-Type")).collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].value.as_str(), "application/json");
        assert_eq!(response.status_code().0, 200);
    }

    #[test]
    fn test_empty_reply_has_no_content_type() {
        let response = Reply::empty(204).into_response();
        assert!(!response.headers().iter().any(|h| h.field.equiv("Content-Type")));
        assert!(response.headers().iter().any(|h| h.field.equiv("Access-Control-Allow-Methods")));
        assert_eq!(response.status_code().0, 204);
    }

    #[test]
    fn test_read_body() {
        let body = br#"{"name":"Grace"}"#;
        assert_eq!(read_body(&body[..]), Ok(r#"{"name":"Grace"}"#.to_string()));
        assert_eq!(read_body(std::io::empty()), Ok(String::new()));

        let limit = vec![b' '; MAX_BODY as usize];
        assert_eq!(read_body(&limit[..]).map(|b| b.len()), Ok(MAX_BODY as usize));
    }

    #[test]
    fn test_read_body_rejects_invalid_utf8() {
        let reply = read_body(std::io::Cursor::new(vec![b'{', 0xff, 0xfe, b'}'])).unwrap_err();
        assert_eq!(reply.status, 400);
        let message = reply.body.unwrap()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("Invalid request body"), "{}", message);
    }

    #[test]
    fn test_read_body_rejects_oversize() {
        let oversize = vec![b'a'; MAX_BODY as usize + 1];
        let reply = read_body(&oversize[..]).unwrap_err();
        assert_eq!(
            reply,
            Reply::json(413, json!({ "success": false, "message": "Request body too large" }))
        );
    }

    #[test]
    fn test_read_body_reports_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        assert_eq!(read_body(Broken).unwrap_err().status, 400);
    }
}
