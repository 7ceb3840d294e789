//! Tarjetas compactas por compañía con temas e insights desplegables.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::html::Html;
use crate::markup;
use crate::models::{CompanyScoring, OrderedMap};
use crate::render::chips::render_theme_chip;

/// Longitud del extracto de la motivación en la cabecera de la tarjeta.
const MOTIVATION_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySort {
    #[default]
    ScoreDesc,
    ScoreAsc,
    NameAsc,
    NameDesc,
}

impl CompanySort {
    pub fn as_str(self) -> &'static str {
        match self {
            CompanySort::ScoreDesc => "score_desc",
            CompanySort::ScoreAsc => "score_asc",
            CompanySort::NameAsc => "name_asc",
            CompanySort::NameDesc => "name_desc",
        }
    }

    fn compare(self, a: (&str, &CompanyScoring), b: (&str, &CompanyScoring)) -> Ordering {
        match self {
            CompanySort::ScoreDesc => b.1.composite_score.total_cmp(&a.1.composite_score),
            CompanySort::ScoreAsc => a.1.composite_score.total_cmp(&b.1.composite_score),
            CompanySort::NameAsc => a.0.to_lowercase().cmp(&b.0.to_lowercase()),
            CompanySort::NameDesc => b.0.to_lowercase().cmp(&a.0.to_lowercase()),
        }
    }
}

impl FromStr for CompanySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score_desc" => Ok(CompanySort::ScoreDesc),
            "score_asc" => Ok(CompanySort::ScoreAsc),
            "name_asc" => Ok(CompanySort::NameAsc),
            "name_desc" => Ok(CompanySort::NameDesc),
            other => Err(format!("Orden de compañías desconocido: {other}")),
        }
    }
}

/// Compañías ordenadas y filtradas por nombre. La ordenación es estable:
/// los empates conservan el orden del informe.
pub fn sorted_companies<'a>(
    scoring: &'a OrderedMap<CompanyScoring>,
    sort: CompanySort,
    search: &str,
) -> Vec<(&'a str, &'a CompanyScoring)> {
    let needle = search.trim().to_lowercase();
    let mut companies: Vec<_> = scoring
        .iter()
        .filter(|(name, _)| needle.is_empty() || name.to_lowercase().contains(&needle))
        .collect();
    companies.sort_by(|a, b| sort.compare(*a, *b));
    companies
}

fn motivation_preview(motivation: Option<&str>) -> String {
    match motivation {
        Some(text) if text.chars().count() > MOTIVATION_PREVIEW_CHARS => {
            let cut: String = text.chars().take(MOTIVATION_PREVIEW_CHARS).collect();
            format!("{cut}...")
        }
        Some(text) => text.to_string(),
        None => "No insights available".to_string(),
    }
}

fn sort_option(current: CompanySort, value: CompanySort, label: &'static str) -> Html {
    let selected = if current == value { " selected" } else { "" };
    markup!(r#"<option value="{}"{}>{}</option>"#, value.as_str(), Html::from_static(selected), label)
}

fn render_card(name: &str, company: &CompanyScoring, focused: bool) -> Html {
    let themes: Html = company
        .active_themes()
        .map(|(theme, score)| render_theme_chip(theme, score))
        .collect();
    let theme_count = company.active_themes().count();
    let focus = if focused {
        Html::from_static(r#" company-card-focused ring-2 ring-blue-500" data-focused="true"#)
    } else {
        Html::new()
    };

    markup!(
        r#"<div class="company-card bg-gradient-to-r from-zinc-800 to-zinc-800/50 rounded-lg border border-zinc-700{}" data-company-name="{}" data-score="{}"><div class="px-4 py-2 flex items-center justify-between"><div class="flex items-center gap-3 flex-1 min-w-0"><span class="bg-blue-500 text-white px-2 py-1 rounded font-bold text-xs font-mono">{}</span><div class="flex-1 min-w-0"><h4 class="text-white font-bold truncate">{}</h4><div class="text-zinc-400 text-xs">{}</div><div class="text-zinc-500 text-xs truncate motivation-preview">{}</div></div></div><div class="flex items-center gap-3 flex-shrink-0"><div class="flex flex-col items-center bg-blue-500/10 border border-blue-500/30 rounded px-3 py-1"><div class="text-xl font-bold text-blue-400">{}</div><div class="text-[10px] text-zinc-400">Score</div></div><button type="button" data-toggle="themes" class="px-3 py-1 bg-emerald-500/10 border border-emerald-500/30 rounded text-emerald-400 text-xs font-medium">{} Themes</button><button type="button" data-toggle="insights" class="px-3 py-1 bg-amber-500/10 border border-amber-500/30 rounded text-amber-400 text-xs font-medium">Insights</button></div></div><div class="themes-section hidden border-t border-zinc-700 px-4 py-3 bg-zinc-900/30"><div class="grid grid-cols-3 md:grid-cols-4 lg:grid-cols-5 gap-2">{}</div></div><div class="insights-section hidden border-t border-zinc-700 px-4 py-3 bg-zinc-900/30"><div class="text-zinc-300 text-sm leading-relaxed">{}</div></div></div>"#,
        focus,
        name.to_lowercase(),
        company.composite_score,
        company.ticker.as_deref().unwrap_or("N/A"),
        name,
        company.industry,
        motivation_preview(company.motivation.as_deref()),
        company.composite_score,
        theme_count,
        themes,
        company.motivation.as_deref().unwrap_or("No insights available")
    )
}

/// Pestaña de compañías: cabecera con buscador/orden y una tarjeta por compañía.
/// `focused` resalta la tarjeta de esa compañía (sin distinguir mayúsculas).
pub fn render_company_cards(
    scoring: &OrderedMap<CompanyScoring>,
    sort: CompanySort,
    search: &str,
    focused: Option<&str>,
) -> Html {
    if scoring.is_empty() {
        return Html::from_static(r#"<p class="text-zinc-400">No company data available</p>"#);
    }

    let options: Html = [
        (CompanySort::ScoreDesc, "Score (High to Low)"),
        (CompanySort::ScoreAsc, "Score (Low to High)"),
        (CompanySort::NameAsc, "Name (A to Z)"),
        (CompanySort::NameDesc, "Name (Z to A)"),
    ]
    .into_iter()
    .map(|(value, label)| sort_option(sort, value, label))
    .collect();

    let mut html = markup!(
        r#"<div class="mb-6"><div class="flex justify-between items-center mb-4"><div><h3 class="text-2xl font-bold text-white mb-1">Company Scores</h3><p class="text-zinc-400 text-sm">Detailed thematic scores for each company</p></div><div class="flex gap-2"><input type="text" id="companySearch" placeholder="Search companies..." value="{}" class="px-3 py-2 bg-zinc-800 border border-zinc-600 rounded-lg text-zinc-200 text-sm"><select id="sortCompanies" class="px-3 py-2 bg-zinc-800 border border-zinc-600 rounded-lg text-zinc-200 text-sm">{}</select></div></div></div><div id="companyCardsContainer" class="space-y-2">"#,
        search,
        options
    );

    for (name, company) in sorted_companies(scoring, sort, search) {
        let is_focused = focused.is_some_and(|f| f.eq_ignore_ascii_case(name));
        html.push(render_card(name, company, is_focused));
    }
    html.push_static("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoring() -> OrderedMap<CompanyScoring> {
        serde_json::from_str(
            r#"{
                "A": {"ticker": "AAA", "industry": "i", "composite_score": 10, "themes": {"x": 6, "y": 0}},
                "B": {"ticker": "BBB", "industry": "i", "composite_score": 5, "themes": {}},
                "C": {"ticker": "CCC", "industry": "i", "composite_score": 10, "themes": {"x": 1}}
            }"#,
        )
        .unwrap()
    }

    fn names(sort: CompanySort) -> Vec<String> {
        let data = scoring();
        sorted_companies(&data, sort, "")
            .into_iter()
            .map(|(n, _)| n.to_string())
            .collect()
    }

    #[test]
    fn score_orders_are_total_and_stable() {
        assert_eq!(names(CompanySort::ScoreDesc), vec!["A", "C", "B"]);
        assert_eq!(names(CompanySort::ScoreAsc), vec!["B", "A", "C"]);
        assert_eq!(names(CompanySort::NameAsc), vec!["A", "B", "C"]);
        assert_eq!(names(CompanySort::NameDesc), vec!["C", "B", "A"]);
    }

    #[test]
    fn sort_names_round_trip() {
        for sort in [
            CompanySort::ScoreDesc,
            CompanySort::ScoreAsc,
            CompanySort::NameAsc,
            CompanySort::NameDesc,
        ] {
            assert_eq!(sort.as_str().parse::<CompanySort>().unwrap(), sort);
        }
        assert!("random".parse::<CompanySort>().is_err());
    }

    #[test]
    fn search_filters_by_lowercase_name() {
        let data = scoring();
        let found = sorted_companies(&data, CompanySort::ScoreDesc, "b");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "B");
    }

    #[test]
    fn only_positive_themes_become_chips() {
        let data = scoring();
        let html = render_company_cards(&data, CompanySort::ScoreDesc, "", None).into_string();
        assert!(html.contains("1 Themes"));
        assert!(html.contains("0 Themes"));
        assert!(html.contains("No insights available"));
        assert!(html.contains(r#"<option value="score_desc" selected>"#));
    }

    #[test]
    fn focused_company_card_is_highlighted() {
        let data = scoring();
        let html = render_company_cards(&data, CompanySort::NameAsc, "", Some("c")).into_string();
        assert_eq!(html.matches(r#"data-focused="true""#).count(), 1);
        let focused = html.find("company-card-focused").unwrap();
        assert!(html[focused..].contains(r#"data-company-name="c""#));
        assert!(!html[..focused].contains(r#"data-company-name="c""#));
    }

    #[test]
    fn long_motivation_is_truncated_in_preview() {
        let long = "x".repeat(150);
        let preview = motivation_preview(Some(&long));
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }
}
