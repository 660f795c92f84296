use crate::cli::ServeArgs;
use crate::config::AppConfig;
use crate::routes::router;
use crate::state::AppState;
use anyhow::Context;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> anyhow::Result<()> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let state = AppState::from_config(&config.forms)?;
    let app = router(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, template_dir = %config.forms.template_dir.display(), "application form service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
