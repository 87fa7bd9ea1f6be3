//! Terminal rendering of search results

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use symbol_resolver::{ResolveEvent, SearchResult};

/// Render candidates as a table, or a one-line notice when there are none
pub fn render_result(result: &SearchResult) -> String {
    if result.is_empty() {
        return format!("#{} no matches", result.generation_id);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Symbol", "Name", "Sector", "Price", "Change", "Cap"]);

    for candidate in &result.candidates {
        table.add_row(vec![
            candidate.symbol.clone(),
            candidate.display_name.clone(),
            candidate.sector.clone(),
            format!("{:.2}", candidate.current_price),
            format!("{:+.2}%", candidate.change_percent),
            candidate.market_cap_bucket.to_string(),
        ]);
    }

    let strategy = result.strategy.map_or("none", |s| s.name());
    format!("#{} via {strategy}\n{table}", result.generation_id)
}

pub fn render_event(event: &ResolveEvent) -> String {
    match event {
        ResolveEvent::Cleared => "(cleared)".to_string(),
        ResolveEvent::Resolved(result) => render_result(result),
    }
}
