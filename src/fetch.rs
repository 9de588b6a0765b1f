use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a fetch failed. Every variant ends up as one user-facing notice.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("server responded with {status}")]
    Status { status: StatusCode },
    #[error("unexpected response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("malformed feed: {0}")]
    Feed(#[source] rss::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub http_client: Option<HttpClient>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("gamedeals-tui/{}", crate::VERSION),
            timeout: DEFAULT_TIMEOUT,
            http_client: None,
        }
    }
}

impl ClientConfig {
    /// Returns the injected client or builds one honoring `timeout`.
    pub fn http(&self) -> Result<HttpClient, reqwest::Error> {
        match &self.http_client {
            Some(client) => Ok(client.clone()),
            None => HttpClient::builder().timeout(self.timeout).build(),
        }
    }
}

pub fn get_bytes(http: &HttpClient, user_agent: &str, url: Url) -> Result<Vec<u8>, FetchError> {
    let response = http
        .get(url)
        .header(USER_AGENT, user_agent)
        .send()
        .map_err(FetchError::Network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status { status });
    }

    let body = response.bytes().map_err(FetchError::Network)?;
    Ok(body.to_vec())
}

pub fn get_json<T: DeserializeOwned>(
    http: &HttpClient,
    user_agent: &str,
    url: Url,
) -> Result<T, FetchError> {
    let body = get_bytes(http, user_agent, url)?;
    serde_json::from_slice(&body).map_err(FetchError::Decode)
}

/// Canned HTTP responses for client tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::net::TcpListener;
    use std::thread;

    use crossbeam_channel::{unbounded, Receiver};
    use tiny_http::{Header, Response, Server};

    pub struct CannedServer {
        pub base: String,
        pub requests: Receiver<String>,
    }

    /// Serves `responses` in order, one per request, then stops.
    pub fn serve(responses: Vec<(u16, &'static str, String)>) -> CannedServer {
        let server = Server::http("127.0.0.1:0").expect("bind canned server");
        let addr = server
            .server_addr()
            .to_ip()
            .expect("canned server has an ip address");
        let (tx, rx) = unbounded();
        thread::spawn(move || {
            for (status, content_type, body) in responses {
                let Ok(request) = server.recv() else {
                    return;
                };
                let _ = tx.send(request.url().to_string());
                let header = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                    .expect("valid header");
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });
        CannedServer {
            base: format!("http://{addr}"),
            requests: rx,
        }
    }

    pub fn json(body: &str) -> (u16, &'static str, String) {
        (200, "application/json", body.to_string())
    }

    /// A base URL nobody listens on.
    pub fn dead_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
        let addr = listener.local_addr().expect("probe address");
        drop(listener);
        format!("http://{addr}")
    }
}
