use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::crate_version;
use gateway_server::ServeConfig;
use mimalloc::MiMalloc;
use tokio::runtime;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod args;
mod config;
mod telemetry;

const THREAD_NAME: &str = "cosmos-graphql-gateway";

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000);

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    let config = self::config::load(&args)?;

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()?;

    runtime.block_on(async move {
        telemetry::init(&args)?;

        let crate_version = crate_version!();
        tracing::info!("Cosmos GraphQL Gateway {crate_version}");

        let listen_address = args
            .listen_address
            .or(config.network.listen_address)
            .unwrap_or(DEFAULT_LISTEN_ADDRESS);

        let config = ServeConfig { listen_address, config };

        gateway_server::serve(config).await?;

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
