// src/checker/http.rs
// =============================================================================
// The real Transport: HTTP requests through one shared reqwest Client.
//
// Key functionality:
// - Builds a single pooled client from Settings (headers, TLS strictness,
//   redirect limit)
// - Sends HEAD or GET and reports the final status code
// - Sorts reqwest errors into TransportError variants
//
// The timeout is not configured on the client: LinkChecker wraps every
// request in tokio::time::timeout, so fake transports get the same rule.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{redirect, Client};
use std::error::Error as StdError;
use std::io;
use url::Url;

use super::transport::{Method, Transport, TransportError};
use crate::config::Settings;

const MAX_REDIRECTS: usize = 10;

// Some hosts answer bots with 403; look like a browser.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        // User headers win over the defaults above
        for (name, value) in &settings.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name '{name}'"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header '{name}'"))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(!settings.strict_ssl)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &Url) -> Result<u16, TransportError> {
        let request = match method {
            Method::Head => self.client.head(url.as_str()),
            Method::Get => self.client.get(url.as_str()),
        };

        // Only the status matters; a GET body is never read.
        request
            .send()
            .await
            .map(|response| response.status().as_u16())
            .map_err(categorize_error)
    }
}

// Substrings that mark a handshake or certificate failure in an error source
const TLS_MARKERS: &[&str] = &["certificate", "tls", "ssl", "handshake"];

// The top-level reqwest message contains the request URL, so only the source
// chain of the URL-less error is inspected when looking for TLS failures.
fn categorize_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        return TransportError::Timeout;
    }

    let error = error.without_url();
    let detail = error_chain(&error);

    if is_tls_failure(&error) {
        TransportError::Tls(detail)
    } else if error.is_connect() {
        TransportError::Unreachable(detail)
    } else if error.is_redirect() {
        TransportError::Unreachable("too many redirects".to_string())
    } else {
        TransportError::Rejected(detail)
    }
}

fn is_tls_failure(error: &(dyn StdError + 'static)) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        // rustls surfaces handshake failures as InvalidData io errors
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            if io.kind() == io::ErrorKind::InvalidData {
                return true;
            }
        }
        let message = cause.to_string().to_lowercase();
        if TLS_MARKERS.iter().any(|marker| message.contains(marker)) {
            return true;
        }
        source = cause.source();
    }
    false
}

fn error_chain(error: &dyn StdError) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|inner| inner as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer("invalid peer certificate: UnknownIssuer", None))),
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: invalid peer certificate: UnknownIssuer"
        );
    }

    #[test]
    fn test_tls_is_detected_from_sources_only() {
        let refused = Layer(
            "error sending request for url (https://www.openssl.org/docs/tls-setup)",
            Some(Box::new(Layer(
                "tcp connect error",
                Some(Box::new(Layer("Connection refused (os error 111)", None))),
            ))),
        );
        assert!(!is_tls_failure(&refused));

        let bad_cert = Layer(
            "error sending request",
            Some(Box::new(Layer("invalid peer certificate: UnknownIssuer", None))),
        );
        assert!(is_tls_failure(&bad_cert));
    }

    #[test]
    fn test_handshake_io_error_is_tls() {
        #[derive(Debug)]
        struct Wrapper(io::Error);

        impl fmt::Display for Wrapper {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("client error (Connect)")
            }
        }

        impl StdError for Wrapper {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        let err = Wrapper(io::Error::new(io::ErrorKind::InvalidData, "peer misbehaved"));
        assert!(is_tls_failure(&err));

        let err = Wrapper(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(!is_tls_failure(&err));
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable_whatever_the_path() {
        // Bind then drop to get a local port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = HttpTransport::new(&Settings::default()).unwrap();

        for path in ["docs", "docs/tls-setup", "openssl", "ssl-certificate"] {
            let url = Url::parse(&format!("http://127.0.0.1:{port}/{path}")).unwrap();
            let answer = transport.send(Method::Head, &url).await;
            assert!(
                matches!(answer, Err(TransportError::Unreachable(_))),
                "{path}: {answer:?}"
            );
        }
    }

    #[test]
    fn test_client_builds_from_settings() {
        let mut settings = Settings::default();
        settings
            .extra_headers
            .insert("Authorization".to_string(), "Bearer token".to_string());
        assert!(HttpTransport::new(&settings).is_ok());
    }

    #[test]
    fn test_client_rejects_bad_header() {
        let mut settings = Settings::default();
        settings
            .extra_headers
            .insert("Bad Header".to_string(), "x".to_string());
        assert!(HttpTransport::new(&settings).is_err());
    }
}
