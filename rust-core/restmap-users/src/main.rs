//! # restmap users
//!
//! Serves the sample users resource over HTTP.
//!
//! ```text
//! GET    /users/{id}   one user, 404 if unknown
//! GET    /users/       all users
//! POST   /users/       add a user, 409 if the id exists
//! DELETE /users/{id}   remove a user
//! ```

mod users;

use clap::Parser;
use restmap_core::{Dispatcher, Server, ServerConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "restmap-users")]
#[command(about = "Sample users resource served by restmap", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    address: SocketAddr,

    /// Path the resource is mounted under
    #[arg(long, default_value = "/users")]
    base_path: String,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_body_size: usize,

    /// Seconds to wait for open connections on shutdown
    #[arg(long, default_value_t = 30)]
    shutdown_timeout: u64,

    /// Close connections after each response
    #[arg(long)]
    no_keep_alive: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            address: self.address,
            keep_alive: !self.no_keep_alive,
            shutdown_timeout: Duration::from_secs(self.shutdown_timeout),
            max_body_size: self.max_body_size,
        }
    }
}

/// Initialize tracing; `RUST_LOG` overrides the default directives
fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("restmap_core=info,restmap_users=info"))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|e| anyhow::anyhow!(e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let store = users::UserStore::seeded();
    let dispatcher = Dispatcher::mount(&cli.base_path, users::routes(&store))?;
    info!(
        "Registered {} route(s) under {}",
        dispatcher.routes().len(),
        dispatcher.base_path()
    );

    Server::new(dispatcher)
        .with_config(cli.server_config())
        .serve()
        .await?;

    info!("Server stopped");
    Ok(())
}
