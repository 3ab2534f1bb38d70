use health_endpoint::CancellationToken;
use health_service::config::ServiceConfig;
use health_service::startup::Application;
use tokio::task::JoinHandle;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub shutdown: CancellationToken,
    pub server: JoinHandle<std::io::Result<()>>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut ServiceConfig)) -> Self {
        let mut config = ServiceConfig::default();
        config.common.port = 0; // Random port for testing
        customize(&mut config);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let shutdown = app.shutdown_token();
        let address = format!("http://127.0.0.1:{}", port);

        let server = tokio::spawn(app.run_until_stopped());

        // Wait for HTTP server to be ready by polling an address we know is bound
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            shutdown,
            server,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Minimal upstream that answers every request with `status`.
pub async fn spawn_upstream(status: axum::http::StatusCode) -> String {
    let app = axum::Router::new().fallback(move || async move { status });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://127.0.0.1:{}/status", port)
}
