mod seed;
mod ws;

use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use clap::Parser;

use nonet::{MemoryStore, Registry, Router};

#[derive(Parser)]
#[command(name = "nonet-server")]
#[command(about = "Collaborative sudoku sync server")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    let store = MemoryStore::new();
    seed::populate(&store);
    let router = Arc::new(Router::new(Registry::new(), Arc::new(store)));

    let app = axum::Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(router);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("Server started on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
