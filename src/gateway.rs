//! LLM gateway.
//!
//! Sends one prompt per call to a text-generation endpoint speaking the
//! Ollama `/api/generate` protocol:
//!
//! ```text
//! POST {endpoint}
//! {"model": "llama3.2", "prompt": "...", "stream": false}
//!
//! 200 OK
//! {"response": "...", ...}
//! ```
//!
//! `TextGenerator::generate` reports failures as `GatewayError`; `invoke`
//! folds them into an `Error: ...` string so callers can show the failure as
//! an assistant reply. There is no retry.

use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::error::AnalysisError;

/// Errors that can occur while generating text.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

/// Request body of the generate endpoint.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// The part of the generate response we use.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// Anything that turns a prompt into generated text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Blocking client for an Ollama-compatible endpoint.
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    config: GatewayConfig,
}

impl OllamaClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        // `None` disables the blocking client's 30 s default
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        info!("LLM endpoint {} (model {})", config.endpoint, config.model);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };
        debug!("POST {} ({} prompt characters)", self.config.endpoint, prompt.chars().count());

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(GatewayError::Status { status, body });
        }

        parse_generate_response(&body)
    }
}

/// Extracts the `response` text from a generate response body.
pub fn parse_generate_response(body: &str) -> Result<String, GatewayError> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;
    Ok(parsed.response)
}

/// Sends a prompt and returns the reply, or `Error: <details>` on failure.
pub fn invoke(generator: &dyn TextGenerator, prompt: &str) -> String {
    match generator.generate(prompt) {
        Ok(text) => text,
        Err(e) => {
            let message = AnalysisError::from(e).with_causes();
            warn!("LLM request failed: {}", message);
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String, GatewayError> {
            Err(GatewayError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "model is loading".to_string(),
            })
        }
    }

    struct EchoGenerator;

    impl TextGenerator for EchoGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
            Ok(format!("echo: {}", prompt))
        }
    }

    /// Reads one HTTP request (headers and Content-Length body).
    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves a single canned response and hands back the request it saw.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        serve_after(Duration::ZERO, status_line, body)
    }

    /// Like `serve_once`, but waits `delay` before answering.
    fn serve_after(
        delay: Duration,
        status_line: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            thread::sleep(delay);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            // The client may have given up already
            let _ = stream.write_all(response.as_bytes());
            request
        });
        (format!("http://{}/api/generate", addr), handle)
    }

    fn client_for(endpoint: String) -> OllamaClient {
        OllamaClient::new(GatewayConfig {
            endpoint,
            timeout: Some(Duration::from_secs(10)),
            ..GatewayConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_generate_response() {
        let body = r#"{"model":"llama3.2","response":"A short genome.","done":true}"#;
        assert_eq!(parse_generate_response(body).unwrap(), "A short genome.");
    }

    #[test]
    fn test_parse_malformed_response() {
        assert!(matches!(
            parse_generate_response("not json"),
            Err(GatewayError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_generate_response(r#"{"done":true}"#),
            Err(GatewayError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: "hi",
            stream: false,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"model":"llama3.2","prompt":"hi","stream":false}"#
        );
    }

    #[test]
    fn test_invoke_passes_reply_through() {
        assert_eq!(invoke(&EchoGenerator, "ping"), "echo: ping");
    }

    #[test]
    fn test_invoke_failure_becomes_error_text() {
        let reply = invoke(&FailingGenerator, "ping");
        assert!(reply.starts_with("Error:"));
        assert!(reply.contains("model is loading"));
    }

    #[test]
    fn test_invoke_unreachable_endpoint() {
        // Bind then drop a listener so the port is very likely closed
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = client_for(format!("http://127.0.0.1:{}/api/generate", port));

        let reply = invoke(&client, "ping");
        assert!(reply.starts_with("Error: request failed:"), "got {:?}", reply);
        assert!(reply.to_lowercase().contains("connection refused"), "got {:?}", reply);
    }

    #[test]
    fn test_default_config_has_no_timeout() {
        assert_eq!(GatewayConfig::default().timeout, None);
        let client = OllamaClient::new(GatewayConfig::default()).unwrap();
        assert_eq!(client.config().timeout, None);
    }

    #[test]
    fn test_explicit_timeout_reports_cause() {
        let (endpoint, _server) = serve_after(
            Duration::from_secs(3),
            "200 OK",
            r#"{"response":"too late"}"#,
        );
        let client = OllamaClient::new(GatewayConfig {
            endpoint,
            timeout: Some(Duration::from_millis(300)),
            ..GatewayConfig::default()
        })
        .unwrap();

        let started = Instant::now();
        let reply = invoke(&client, "ping");
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(reply.starts_with("Error:"), "got {:?}", reply);
        assert!(reply.contains("timed out"), "got {:?}", reply);
    }

    #[test]
    fn test_slow_reply_within_timeout() {
        let (endpoint, server) = serve_after(
            Duration::from_millis(500),
            "200 OK",
            r#"{"response":"slow model reply"}"#,
        );
        let client = OllamaClient::new(GatewayConfig {
            endpoint,
            ..GatewayConfig::default()
        })
        .unwrap();

        assert_eq!(invoke(&client, "ping"), "slow model reply");
        server.join().unwrap();
    }

    #[test]
    fn test_generate_success() {
        let (endpoint, server) = serve_once("200 OK", r#"{"response":"It is a coronavirus."}"#);
        let client = client_for(endpoint);

        let reply = client.generate("What is it?").unwrap();
        assert_eq!(reply, "It is a coronavirus.");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/generate"));
        assert!(request.contains(r#""model":"llama3.2""#));
        assert!(request.contains(r#""prompt":"What is it?""#));
        assert!(request.contains(r#""stream":false"#));
    }

    #[test]
    fn test_generate_http_error() {
        let (endpoint, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
        let client = client_for(endpoint);

        let result = client.generate("ping");
        assert!(matches!(
            result,
            Err(GatewayError::Status { status, .. }) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        server.join().unwrap();
    }
}
