use anyhow::Result;

use sitesearch::models::SiteStatus;

use super::AppContext;

/// Index every configured site, or only `url`, and wait for completion
///
/// Ctrl-C cancels the campaign; pipelines stop at their next checkpoint.
pub async fn index(ctx: &AppContext, url: Option<String>) -> Result<()> {
    match url.as_deref() {
        Some(url) => {
            println!("Indexing site: {url}");
            ctx.service.index_page(url)?;
        }
        None => {
            println!("Indexing {} configured sites", ctx.config.sites.len());
            ctx.service.start_indexing()?;
        }
    }

    tokio::select! {
        () = ctx.service.wait() => {}
        _ = tokio::signal::ctrl_c() => {
            println!("\nStopping indexing...");
            if let Err(e) = ctx.service.stop_indexing() {
                tracing::debug!(error = %e, "Campaign finished before stop");
            }
            ctx.service.wait().await;
        }
    }

    let stats = ctx.service.statistics()?;
    println!("\nIndexing Results");
    println!("================");
    for site in &stats.detailed {
        match site.status {
            SiteStatus::Failed => println!(
                "{} [{}] {}",
                site.url,
                site.status,
                site.error.as_deref().unwrap_or("unknown error")
            ),
            _ => println!(
                "{} [{}] pages: {}, lemmas: {}",
                site.url, site.status, site.pages, site.lemmas
            ),
        }
    }

    Ok(())
}
