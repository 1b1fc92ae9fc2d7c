use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn handle(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("{}", format!("envstate server on {addr}").green().bold());

    envstate_engine::server::serve(addr, Arc::new(super::local_executor())).await?;
    Ok(())
}
