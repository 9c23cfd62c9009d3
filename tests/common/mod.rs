//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use tokio::task::JoinHandle;

use response_simulator::config::SimulatorConfig;
use response_simulator::http::HttpServer;
use response_simulator::lifecycle::Shutdown;
use response_simulator::net::Listener;

/// A simulator running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    /// URL of the simulation endpoint with the given query string.
    pub fn url(&self, query: &str) -> String {
        if query.is_empty() {
            format!("http://{}/request", self.addr)
        } else {
            format!("http://{}/request?{}", self.addr, query)
        }
    }

    /// Trigger shutdown and wait for the server task to finish.
    #[allow(dead_code)]
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.trigger();
        self.handle.await.expect("server task panicked")
    }
}

/// Start a simulator with default settings on `127.0.0.1:0`.
pub async fn start_server() -> TestServer {
    let mut config = SimulatorConfig::default();
    config.timeouts.shutdown_grace_secs = 2;
    start_server_with(config).await
}

/// Start a simulator with the given settings on `127.0.0.1:0`.
pub async fn start_server_with(mut config: SimulatorConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// HTTP client that ignores proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
