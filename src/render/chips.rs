//! Chips de intensidad por tema (escala absoluta de tres niveles).
//!
//! Esta escala es independiente de las bandas relativas del heatmap.

use crate::html::Html;
use crate::markup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityTier {
    High,
    Medium,
    Low,
}

impl IntensityTier {
    pub fn for_score(score: f64) -> Self {
        if score > 5.0 {
            IntensityTier::High
        } else if score > 2.0 {
            IntensityTier::Medium
        } else {
            IntensityTier::Low
        }
    }

    pub fn classes(self) -> &'static str {
        match self {
            IntensityTier::High => "bg-emerald-500 text-white border-emerald-400",
            IntensityTier::Medium => "bg-emerald-700 text-emerald-100 border-emerald-600",
            IntensityTier::Low => "bg-emerald-900 text-emerald-300 border-emerald-800",
        }
    }
}

pub fn render_theme_chip(theme: &str, score: f64) -> Html {
    markup!(
        r#"<div class="flex items-center justify-between {} border rounded px-2 py-1"><span class="text-xs font-medium truncate flex-1 mr-1" title="{}">{}</span><span class="font-bold text-xs flex-shrink-0">{}</span></div>"#,
        IntensityTier::for_score(score).classes(),
        theme,
        theme,
        score
    )
}
