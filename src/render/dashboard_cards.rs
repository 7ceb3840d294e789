//! Tarjetas resumen: "At a Glance", Top 10 compañías y Top 10 temas.

use std::collections::HashSet;

use crate::html::Html;
use crate::markup;
use crate::models::{CompanyScoring, CurrentConfig, Report};
use crate::render::chips::render_theme_chip;

pub const TOP_N: usize = 10;

const MEDAL_COLORS: [&str; 3] = ["text-yellow-400", "text-gray-300", "text-amber-600"];

/// Cifras agregadas del informe.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStats {
    pub total_companies: usize,
    pub total_themes: usize,
    pub max_score: f64,
    pub total_evidences: usize,
}

impl ReportStats {
    pub fn from_report(report: &Report) -> Self {
        let themes: HashSet<&str> = report
            .theme_scoring
            .iter()
            .flat_map(|(_, s)| s.themes.keys())
            .collect();
        let max_score = report
            .theme_scoring
            .iter()
            .map(|(_, s)| s.composite_score)
            .fold(0.0, f64::max);
        Self {
            total_companies: report.theme_scoring.len(),
            total_themes: themes.len(),
            max_score,
            total_evidences: report.content.len(),
        }
    }
}

fn medal(idx: usize) -> &'static str {
    MEDAL_COLORS.get(idx).copied().unwrap_or("text-zinc-400")
}

fn render_at_a_glance(stats: &ReportStats, config: Option<&CurrentConfig>) -> Html {
    let theme = config.map(|c| c.theme.as_str()).unwrap_or("N/A");
    let universe = config.map(|c| c.companies.as_str()).unwrap_or("N/A");
    let is_demo = config.is_some_and(|c| c.is_demo);
    let run_date = config
        .map(|c| c.run_at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    let demo_badge = if is_demo {
        Html::from_static(r#"<div class="text-base text-amber-400 font-semibold">Demo Mode</div>"#)
    } else {
        Html::new()
    };
    let demo_details = if is_demo {
        Html::from_static(r#"<div class="text-base text-white font-semibold">Source: Earnings Transcripts</div><div class="text-base text-white font-semibold">Period: Last 4 quarters</div>"#)
    } else {
        markup!(r#"<div class="text-sm text-zinc-400">Run: {}</div>"#, run_date)
    };

    markup!(
        r#"<div class="bg-gradient-to-br from-blue-900/30 to-blue-800/20 rounded-xl border border-blue-700/40 p-6"><div class="flex items-center gap-3 mb-4"><h3 class="text-xl font-bold text-white">At a Glance</h3></div><div class="space-y-3"><div class="flex justify-between items-center"><span class="text-zinc-300">Companies Analyzed</span><span class="text-2xl font-bold text-blue-400">{}</span></div><div class="flex justify-between items-center"><span class="text-zinc-300">Themes Identified</span><span class="text-2xl font-bold text-emerald-400">{}</span></div><div class="flex justify-between items-center"><span class="text-zinc-300">Highest Score</span><span class="text-2xl font-bold text-amber-400">{}</span></div><div class="flex justify-between items-center"><span class="text-zinc-300">Supporting Evidences</span><span class="text-2xl font-bold text-purple-400">{}</span></div><div class="pt-4 mt-4 border-t-2 border-blue-600/50"><h4 class="text-sm font-bold text-blue-300 mb-2 uppercase tracking-wide">Current Configuration</h4><div class="space-y-1.5">{}<div class="text-base text-white font-semibold">Theme: {}</div><div class="text-base text-white font-semibold">Universe: {}</div>{}</div></div></div></div>"#,
        stats.total_companies,
        stats.total_themes,
        stats.max_score,
        stats.total_evidences,
        demo_badge,
        theme,
        universe,
        demo_details
    )
}

fn render_top_company(idx: usize, name: &str, company: &CompanyScoring) -> Html {
    let chips: Html = company
        .active_themes()
        .map(|(theme, score)| render_theme_chip(theme, score))
        .collect();
    markup!(
        r#"<div class="dashboard-company-item border-b border-zinc-700 last:border-b-0" data-company="{}"><div class="flex items-center gap-2 p-2"><div class="flex items-center justify-center w-6 h-6 {} font-bold text-sm">{}</div><div class="flex-1 min-w-0"><span class="text-[10px] bg-blue-500 text-white px-1.5 py-0.5 rounded font-mono">{}</span> <span class="text-white text-sm truncate">{}</span></div><div class="text-lg font-bold text-blue-400">{}</div><button type="button" data-toggle="themes" class="px-2 py-1 bg-emerald-500/10 border border-emerald-500/30 rounded text-emerald-400 text-xs">{}</button><button type="button" data-toggle="insights" class="px-2 py-1 bg-amber-500/10 border border-amber-500/30 rounded text-amber-400 text-xs">Insights</button></div><div class="themes-section hidden bg-zinc-900/30 px-4 py-2"><div class="grid grid-cols-2 gap-1">{}</div></div><div class="insights-section hidden bg-zinc-900/30 px-4 py-2"><div class="text-zinc-300 text-xs leading-relaxed">{}</div></div></div>"#,
        name,
        Html::from_static(medal(idx)),
        idx + 1,
        company.ticker.as_deref().unwrap_or("N/A"),
        name,
        company.composite_score,
        company.active_themes().count(),
        chips,
        company.motivation.as_deref().unwrap_or("No insights available")
    )
}

fn render_top_companies(report: &Report) -> Html {
    let items: Html = report
        .companies_by_score()
        .into_iter()
        .take(TOP_N)
        .enumerate()
        .map(|(idx, (name, company))| render_top_company(idx, name, company))
        .collect();
    markup!(
        r#"<div class="bg-gradient-to-br from-zinc-800 to-zinc-900 rounded-xl border border-zinc-700 p-6"><div class="flex items-center gap-3 mb-4"><h3 class="text-xl font-bold text-white">Top 10 Companies</h3></div><div class="space-y-0 max-h-[400px] overflow-y-auto">{}</div></div>"#,
        items
    )
}

/// Ancho de la barra relativo al tema líder, en porcentaje.
pub fn theme_bar_width(total: f64, leader: f64) -> f64 {
    let leader = if leader != 0.0 { leader } else { 1.0 };
    (total / leader * 100.0).min(100.0)
}

fn render_top_themes(report: &Report) -> Html {
    let themes = report.theme_totals();
    let leader = themes.first().map(|(_, total)| *total).unwrap_or(1.0);
    let items: Html = themes
        .iter()
        .take(TOP_N)
        .enumerate()
        .map(|(idx, (theme, total))| {
            markup!(
                r#"<div class="border-b border-zinc-700 last:border-b-0 p-2 cursor-pointer" data-focus-theme="{}"><div class="flex items-center gap-2"><div class="flex items-center justify-center w-6 h-6 {} font-bold text-sm">{}</div><div class="flex-1 min-w-0"><div class="text-white text-sm truncate" title="{}">{}</div><div class="mt-1"><div class="h-1.5 bg-zinc-700 rounded-full overflow-hidden"><div class="h-full bg-gradient-to-r from-emerald-600 to-emerald-400 rounded-full" style="width: {}%"></div></div></div></div><span class="text-lg font-bold text-emerald-400">{}</span></div></div>"#,
                theme,
                Html::from_static(medal(idx)),
                idx + 1,
                theme,
                theme,
                theme_bar_width(*total, leader),
                *total
            )
        })
        .collect();
    markup!(
        r#"<div class="bg-gradient-to-br from-zinc-800 to-zinc-900 rounded-xl border border-zinc-700 p-6"><div class="flex items-center gap-3 mb-4"><h3 class="text-xl font-bold text-white">Top 10 Themes</h3></div><div class="space-y-0 max-h-[400px] overflow-y-auto">{}</div></div>"#,
        items
    )
}

/// Fila de tres tarjetas sobre el heatmap.
pub fn render_dashboard_cards(report: &Report, config: Option<&CurrentConfig>) -> Html {
    let stats = ReportStats::from_report(report);
    markup!(
        r#"<div id="dashboardCards" class="grid grid-cols-1 md:grid-cols-3 gap-6 mb-8">{}{}{}</div>"#,
        render_at_a_glance(&stats, config),
        render_top_companies(report),
        render_top_themes(report)
    )
}
