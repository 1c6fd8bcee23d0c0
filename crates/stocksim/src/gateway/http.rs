use std::time::Duration;

use reqwest::blocking::Client;
use stocksim_core::{ResultsAdapter, SimulationRequest, SimulationResult};

use super::{GatewayError, HealthStatus, SimulationGateway, failure_message, health_from_body};

/// Blocking JSON client for the simulation service.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// `timeout: None` disables the transport timeout, including reqwest's 30s default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SimulationGateway for HttpGateway {
    /// POST {base}/simulate
    fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResult, GatewayError> {
        let url = format!("{}/simulate", self.base_url);
        tracing::debug!(%url, "Sending simulation request");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(|e| GatewayError::Transport(format!("simulate request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .map_err(|e| GatewayError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, "Simulation service returned an error");
            return Err(GatewayError::Failure(failure_message(&body)));
        }

        Ok(ResultsAdapter::adapt_slice(&body)?)
    }

    /// GET {base}/health
    fn health(&self) -> HealthStatus {
        let url = format!("{}/health", self.base_url);
        let resp = match self.client.get(&url).send() {
            Ok(resp) => resp,
            Err(e) => return HealthStatus::Unhealthy(format!("cannot reach {url}: {e}")),
        };

        let status = resp.status();
        if !status.is_success() {
            return HealthStatus::Unhealthy(format!("health check returned {status}"));
        }

        match resp.bytes() {
            Ok(body) => health_from_body(&body),
            Err(e) => HealthStatus::Unhealthy(format!("failed to read health response: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    /// Serve one healthy response after `delay`, returning the base URL.
    fn slow_health_server(delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            thread::sleep(delay);
            let body = r#"{"status":"healthy"}"#;
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let gateway = HttpGateway::new("http://localhost:8000/", None).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_unreachable_service_is_unhealthy() {
        // Port 9 (discard) on localhost is closed in any sane test environment
        let gateway =
            HttpGateway::new("http://127.0.0.1:9", Some(Duration::from_millis(500))).unwrap();
        assert!(!gateway.health().is_healthy());
    }

    #[test]
    fn test_configured_timeout_applies() {
        let url = slow_health_server(Duration::from_secs(3));
        let gateway = HttpGateway::new(&url, Some(Duration::from_millis(200))).unwrap();

        let started = Instant::now();
        assert!(!gateway.health().is_healthy());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_no_timeout_outlasts_client_default() {
        // reqwest's blocking client gives up after 30s unless told otherwise
        let url = slow_health_server(Duration::from_secs(31));
        let gateway = HttpGateway::new(&url, None).unwrap();
        assert_eq!(gateway.health(), HealthStatus::Healthy);
    }
}
