use anyhow::{Context, Result};

use super::AppContext;

pub fn search(
    ctx: &AppContext,
    query: &str,
    site: Option<&str>,
    offset: usize,
    limit: Option<usize>,
) -> Result<()> {
    let limit = limit.unwrap_or(ctx.config.search.default_limit);

    println!("Searching for: \"{query}\"");
    println!("================================");

    let response = ctx
        .search
        .search(query, site, offset, limit)
        .context("Search failed")?;

    if response.data.is_empty() {
        println!("\nNo results found for \"{query}\"");
        return Ok(());
    }

    println!(
        "\nShowing {}-{} of {} results:\n",
        offset + 1,
        offset + response.data.len(),
        response.count
    );

    for (i, result) in response.data.iter().enumerate() {
        println!(
            "{}. {} (relevance: {:.3})",
            offset + i + 1,
            result.title,
            result.relevance
        );
        println!("   {}{}", result.site, result.uri);
        if !result.snippet.is_empty() {
            println!(
                "   > {}",
                result.snippet.replace("<b>", "[").replace("</b>", "]")
            );
        }
        println!();
    }

    Ok(())
}
