use anyhow::Result;

use super::AppContext;

pub fn stats(ctx: &AppContext) -> Result<()> {
    let stats = ctx.service.statistics()?;

    println!("Index Statistics");
    println!("================");
    println!("Configured sites: {}", stats.total.sites);
    println!("Pages: {}", stats.total.pages);
    println!("Lemmas: {}", stats.total.lemmas);
    println!("Indexing: {}", stats.total.indexing);

    for site in &stats.detailed {
        println!("\n{} ({})", site.name, site.url);
        println!("--------------");
        println!("Status: {} at {}", site.status, site.status_time.to_rfc3339());
        if let Some(error) = &site.error {
            println!("Last error: {error}");
        }
        println!("Pages: {}", site.pages);
        println!("Lemmas: {}", site.lemmas);
    }

    Ok(())
}
