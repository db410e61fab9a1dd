use anyhow::{Context, Result, bail};
use mongodb::{Database, bson::doc};
use std::{env, os::unix::net::UnixStream, path::Path};
use testcontainers::{
    ContainerAsync, GenericImage,
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
};

const MONGO_PORT: u16 = 27017;

/// Whether testcontainers can reach a Docker-compatible API.
pub fn container_runtime_available() -> bool {
    if let Ok(docker_host) = env::var("DOCKER_HOST") {
        return match docker_host.strip_prefix("unix://") {
            Some(path) => UnixStream::connect(path).is_ok(),
            None => true,
        };
    }

    let socket = Path::new("/var/run/docker.sock");
    socket.exists() && UnixStream::connect(socket).is_ok()
}

pub struct MongoContainer {
    _container: ContainerAsync<GenericImage>,
    uri: String,
}

impl MongoContainer {
    /// Start a standalone `mongod`.
    ///
    /// Tests using it are `#[ignore]`d; run them with `cargo test -- --ignored`.
    pub async fn start() -> Result<Self> {
        if !container_runtime_available() {
            bail!("no container runtime available: start Docker or set DOCKER_HOST");
        }

        let container = GenericImage::new("mongo", "7")
            .with_exposed_port(MONGO_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
            .start()
            .await
            .context("Failed to start MongoDB container")?;

        let host_port = container
            .get_host_port_ipv4(MONGO_PORT.tcp())
            .await
            .context("Failed to resolve MongoDB host port")?;

        Ok(Self {
            _container: container,
            uri: format!("mongodb://127.0.0.1:{host_port}/?directConnection=true"),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub async fn database(&self, name: &str) -> Result<Database> {
        let client = authdb::storage::connect(&self.uri).await?;
        Ok(client.database(name))
    }

    /// Make the TTL monitor run every second instead of every 60.
    pub async fn fast_ttl_monitor(&self) -> Result<()> {
        let client = authdb::storage::connect(&self.uri).await?;
        client
            .database("admin")
            .run_command(doc! { "setParameter": 1, "ttlMonitorSleepSecs": 1 })
            .await?;
        Ok(())
    }
}
