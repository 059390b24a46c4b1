use std::net::SocketAddr;

use crate::infra::config::Config;

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    cfg.validate().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        osascript = %cfg.osascript,
        script_timeout_secs = cfg.script_timeout.as_secs(),
        max_concurrent_scripts = cfg.max_concurrent_scripts,
        query_policy = ?cfg.query_policy,
        "BOOT imessage-mcp"
    );

    let factory = crate::infra::mcp::factory_from_config(&cfg);

    // Stdio mode: run MCP over stdio ONLY (no HTTP).
    if cfg.mode == "stdio" {
        crate::infra::runtime::mcp_transport::serve_stdio(factory)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let app = crate::infra::http_app::build_app(factory);
    let addr: SocketAddr = ([127, 0, 0, 1], cfg.port).into();
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
