//! Heatmap compañías × temas.

use crate::html::Html;
use crate::markup;
use crate::models::{CompanyScoring, OrderedMap, Report};

/// Banda de color relativa al máximo del informe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatBand {
    pub bg: &'static str,
    pub text: &'static str,
    pub border: &'static str,
}

const EMPTY_BAND: HeatBand = HeatBand {
    bg: "bg-zinc-800",
    text: "text-zinc-600",
    border: "border-zinc-700",
};

const EMERALD_BANDS: [(f64, HeatBand); 5] = [
    (0.2, HeatBand { bg: "bg-emerald-900", text: "text-emerald-300", border: "border-emerald-800" }),
    (0.4, HeatBand { bg: "bg-emerald-800", text: "text-emerald-200", border: "border-emerald-700" }),
    (0.6, HeatBand { bg: "bg-emerald-700", text: "text-emerald-100", border: "border-emerald-600" }),
    (0.8, HeatBand { bg: "bg-emerald-600", text: "text-white", border: "border-emerald-500" }),
    (1.0, HeatBand { bg: "bg-emerald-500", text: "text-white", border: "border-emerald-400" }),
];

impl HeatBand {
    /// Banda para una celda. Las puntuaciones nulas o negativas quedan sin color.
    pub fn for_cell(score: f64, max_score: f64) -> HeatBand {
        if score <= 0.0 {
            return EMPTY_BAND;
        }
        let intensity = if max_score > 0.0 { score / max_score } else { 0.0 };
        Self::for_intensity(intensity)
    }

    /// Banda para una intensidad `score / max` en `(0, 1]`.
    pub fn for_intensity(intensity: f64) -> HeatBand {
        EMERALD_BANDS
            .iter()
            .find(|(threshold, _)| intensity <= *threshold)
            .map(|(_, band)| *band)
            .unwrap_or(EMPTY_BAND)
    }
}

const HEADER: &str = r#"<div class="mb-6"><h3 class="text-2xl font-bold text-white mb-2 flex items-center gap-2">Company-Theme Heatmap</h3><p class="text-zinc-400 text-sm mb-6">Theme exposure scores across all companies</p></div>"#;

pub fn render_heatmap(scoring: &OrderedMap<CompanyScoring>) -> Html {
    if scoring.is_empty() {
        return Html::from_static(r#"<p class="text-zinc-400">No company data available</p>"#);
    }

    // Mismas derivaciones que el informe completo, sobre un informe parcial.
    let report = Report {
        theme_scoring: scoring.clone(),
        ..Default::default()
    };
    let themes = report.theme_totals();
    let companies = report.companies_by_score();
    let max_score = report.max_theme_score();

    let mut html = Html::from_static(HEADER);
    html.push(markup!(
        r#"<div class="bg-zinc-800/50 rounded-lg border border-zinc-700 p-4"><div class="mb-4 flex gap-2 items-center text-xs text-zinc-400"><span>Color Scale:</span><span>0</span><div class="flex-1 h-4 bg-gradient-to-r from-zinc-800 via-emerald-700 to-emerald-400 rounded max-w-xs"></div><span>{}</span></div>"#,
        max_score
    ));
    html.push_static(r#"<div class="overflow-x-auto"><table class="w-full border-collapse"><thead><tr><th class="sticky left-0 z-20 bg-zinc-800 px-4 py-3 text-left text-sm font-semibold text-white">Company</th><th class="sticky z-20 bg-zinc-800 px-3 py-3 text-center text-sm font-semibold text-white">Score</th>"#);
    for (theme, _) in &themes {
        html.push(markup!(
            r#"<th class="bg-zinc-800 px-2 py-3 text-sm font-bold text-zinc-200" data-theme="{}"><div class="heatmap-theme-label">{}</div></th>"#,
            theme,
            theme
        ));
    }
    html.push_static("</tr></thead><tbody>");

    for (row_idx, (name, company)) in companies.iter().enumerate() {
        let row_bg = if row_idx % 2 == 0 { "bg-zinc-900/50" } else { "bg-zinc-800/30" };
        html.push(markup!(
            r#"<tr class="{} hover:bg-zinc-700/50"><td class="sticky left-0 z-10 px-4 py-3 text-sm font-medium text-zinc-200"><span class="text-xs bg-blue-500 text-white px-2 py-0.5 rounded font-mono">{}</span> <span class="truncate" title="{}">{}</span></td><td class="px-3 py-3 text-center text-sm font-bold text-blue-400">{}</td>"#,
            row_bg,
            company.ticker.as_deref().unwrap_or("N/A"),
            *name,
            *name,
            company.composite_score
        ));
        for (theme, _) in &themes {
            let score = company.themes.get(theme).copied().unwrap_or(0.0);
            let band = HeatBand::for_cell(score, max_score);
            let shown = if score > 0.0 { Some(score) } else { None };
            html.push(markup!(
                r#"<td class="px-3 py-3 text-center text-xs font-semibold border-b border-r {} {} {}" title="{}&#10;{}: {}">{}</td>"#,
                band.border,
                band.bg,
                band.text,
                *name,
                theme,
                score,
                shown
            ));
        }
        html.push_static("</tr>");
    }

    html.push_static("</tbody></table></div></div>");
    html
}
