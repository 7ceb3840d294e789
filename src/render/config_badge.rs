//! Insignia con la configuración de la última ejecución.

use crate::html::Html;
use crate::markup;
use crate::models::{CurrentConfig, Watchlist};

/// Nombre visible del universo: el de la watchlist con ese id o el valor tal cual.
pub fn universe_name(companies: &str, watchlists: &[Watchlist]) -> String {
    if companies.is_empty() {
        return "Unknown".to_string();
    }
    watchlists
        .iter()
        .find(|w| w.id == companies)
        .map(|w| w.name.clone())
        .unwrap_or_else(|| companies.to_string())
}

pub fn render_config_badge(config: Option<&CurrentConfig>, watchlists: &[Watchlist]) -> Html {
    let Some(config) = config.filter(|c| !c.theme.is_empty()) else {
        return Html::new();
    };
    let universe = universe_name(&config.companies, watchlists);
    let run_time = config.run_at.format("%H:%M").to_string();
    let title = format!(
        "Theme: {}\nUniverse: {}\nLast run: {}",
        config.theme, universe, run_time
    );
    markup!(
        r#"<div class="flex items-center gap-2 justify-between" title="{}"><div class="truncate flex-1"><span class="font-semibold text-blue-400">{}</span><span class="text-zinc-500 mx-1">|</span><span class="text-zinc-400">{}</span></div><span class="text-xs text-zinc-500 flex-shrink-0">{}</span></div>"#,
        title,
        config.theme,
        universe,
        run_time
    )
}
