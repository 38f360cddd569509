pub mod rest;

use std::time::Duration;

use anyhow::{Result, anyhow};
use noticeboard_server::{
    config::{Parser, ServerConfig},
    run::{build_state, run_graceful_with_state},
};
use rand::Rng as _;
use tempfile::TempDir;
use tokio::sync::oneshot;
use tracing::info;
use url::Url;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(4030..5030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

/// Keeps temporary database and running server alive, stops server on drop.
pub struct EnvGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub fn test_config(test_name: &str) -> Result<(ServerConfig, TempDir)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let database_url = format!(
        "sqlite://{}?mode=rwc",
        tmp_data_dir.path().join("noticeboard.db").to_string_lossy()
    );
    let port = random_port()?.to_string();
    let args = &[
        "noticeboard-e2e-tests",
        "--port",
        &port,
        "--database-url",
        &database_url,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((config, tmp_data_dir))
}

pub fn base_url(config: &ServerConfig) -> Result<Url> {
    let url = Url::parse(&format!("http://127.0.0.1:{}/", config.port))?;
    Ok(url)
}

/// Starts server in background and waits until it answers health check
pub async fn launch_env(test_name: &str) -> Result<(reqwest::Client, Url, EnvGuard)> {
    let (config, data_dir) = test_config(test_name)?;
    let base_url = base_url(&config)?;
    let state = build_state(&config).await?;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = run_graceful_with_state(config, state, shutdown).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    let health_url = base_url.join("health")?;
    let mut retries = 50;
    loop {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => break,
            _ if retries > 0 => {
                retries -= 1;
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            _ => return Err(anyhow!("Server did not start")),
        }
    }
    info!("Test server running at {base_url}");

    Ok((
        client,
        base_url,
        EnvGuard {
            data_dir,
            shutdown: Some(tx),
        },
    ))
}

pub fn announcement_url(base_url: &Url, id: impl std::fmt::Display) -> Result<Url> {
    let url = base_url.join(&format!("announcement/{}/", id))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announcement_url() {
        let base = Url::parse("http://127.0.0.1:4100/").unwrap();
        let url = announcement_url(&base, 7).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4100/announcement/7/");

        let cannot_be_base = Url::parse("data:text/plain,noticeboard").unwrap();
        assert!(announcement_url(&cannot_be_base, 7).is_err());
    }
}
