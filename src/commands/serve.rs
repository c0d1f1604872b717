use anyhow::Result;

use sitesearch::api::{ApiServer, AppState};

use super::AppContext;

/// Run the HTTP API until Ctrl-C
///
/// A running campaign is cancelled and awaited before returning.
pub async fn serve(ctx: &AppContext) -> Result<()> {
    let state = AppState {
        service: ctx.service.clone(),
        search: ctx.search.clone(),
        default_limit: ctx.config.search.default_limit,
    };
    let server = ApiServer::new(ctx.config.server.clone(), state);

    println!("Serving on http://{}", server.bind_address());

    server
        .start_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    if ctx.service.is_indexing() {
        ctx.service.stop_indexing()?;
        ctx.service.wait().await;
    }
    Ok(())
}
