//! Controlador de pestañas del informe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::html::Html;
use crate::markup;

pub const DEFAULT_EMPTY_MESSAGE: &str = "No data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Summary,
    Companies,
    Mindmap,
    Evidence,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Summary, Tab::Companies, Tab::Mindmap, Tab::Evidence];

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Summary => "summary",
            Tab::Companies => "companies",
            Tab::Mindmap => "mindmap",
            Tab::Evidence => "evidence",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Summary => "Summary",
            Tab::Companies => "Companies",
            Tab::Mindmap => "Mind Map",
            Tab::Evidence => "Evidence",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| format!("Pestaña desconocida: {s}"))
    }
}

/// Pestaña activa, indicador de carga y contenido de cada pestaña.
#[derive(Debug, Clone, Default)]
pub struct TabController {
    active: Tab,
    loading: [bool; 4],
    content: [Html; 4],
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn is_loading(&self, tab: Tab) -> bool {
        self.loading[tab.index()]
    }

    pub fn set_loading_state(&mut self, tab: Tab, loading: bool) {
        self.loading[tab.index()] = loading;
    }

    pub fn content(&self, tab: Tab) -> &Html {
        &self.content[tab.index()]
    }

    pub fn set_content(&mut self, tab: Tab, html: Html) {
        self.content[tab.index()] = html;
    }

    /// Sustituye el contenido por un marcador vacío con el mensaje dado.
    pub fn show_empty_state(&mut self, tab: Tab, message: Option<&str>) {
        let message = message.unwrap_or(DEFAULT_EMPTY_MESSAGE);
        self.set_content(
            tab,
            markup!(
                r#"<div class="empty-state flex flex-col items-center justify-center py-20 text-zinc-400"><p class="text-lg">{}</p></div>"#,
                message
            ),
        );
    }

    /// Limpia indicadores y contenido; la pestaña activa se conserva.
    pub fn reset(&mut self) {
        self.loading = [false; 4];
        self.content = Default::default();
    }

    pub fn render_nav(&self) -> Html {
        let buttons: Html = Tab::ALL
            .into_iter()
            .map(|tab| {
                let classes = if tab == self.active {
                    "border-blue-500 text-blue-400 bg-blue-500/10"
                } else {
                    "border-transparent text-zinc-400 hover:text-zinc-200"
                };
                markup!(
                    r#"<button type="button" data-tab="{}" class="px-4 py-3 text-sm font-medium border-b-2 {}">{}</button>"#,
                    tab.as_str(),
                    Html::from_static(classes),
                    tab.title()
                )
            })
            .collect();
        markup!(r#"<nav id="tabNav" class="flex gap-1 border-b border-zinc-700">{}</nav>"#, buttons)
    }

    /// Interior de una pestaña: indicador de carga o contenido real.
    pub fn render_panel(&self, tab: Tab) -> Html {
        let (loader_hidden, content_hidden) = if self.is_loading(tab) {
            ("", " hidden")
        } else {
            (" hidden", "")
        };
        markup!(
            r#"<div class="loading-indicator flex items-center justify-center py-20 text-zinc-400{}"><div class="animate-spin h-8 w-8 border-2 border-blue-500 border-t-transparent rounded-full"></div><span class="ml-3">Loading...</span></div><div class="tab-actual-content{}">{}</div>"#,
            Html::from_static(loader_hidden),
            Html::from_static(content_hidden),
            self.content(tab)
        )
    }

    /// Las cuatro pestañas; sólo la activa es visible.
    pub fn render_panels(&self) -> Html {
        Tab::ALL
            .into_iter()
            .map(|tab| {
                let hidden = if tab == self.active { "" } else { " hidden" };
                markup!(
                    r#"<section data-tab-content="{}" class="tab-content{}">{}</section>"#,
                    tab.as_str(),
                    Html::from_static(hidden),
                    self.render_panel(tab)
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_panel_is_visible() {
        let mut tabs = TabController::new();
        tabs.switch_tab(Tab::Mindmap);
        let html = tabs.render_panels().into_string();
        assert_eq!(html.matches(r#"class="tab-content""#).count(), 1);
        assert_eq!(html.matches(r#"class="tab-content hidden""#).count(), 3);
        assert!(html.contains(r#"<section data-tab-content="mindmap" class="tab-content">"#));
        assert!(tabs.render_nav().as_str().contains(r#"data-tab="mindmap" class="px-4 py-3 text-sm font-medium border-b-2 border-blue-500"#));
    }

    #[test]
    fn loading_hides_content() {
        let mut tabs = TabController::new();
        tabs.set_content(Tab::Summary, Html::text("ready"));
        tabs.set_loading_state(Tab::Summary, true);
        let panel = tabs.render_panel(Tab::Summary).into_string();
        assert!(panel.contains(r#"<div class="tab-actual-content hidden">ready</div>"#));
        tabs.set_loading_state(Tab::Summary, false);
        let panel = tabs.render_panel(Tab::Summary).into_string();
        assert!(panel.contains(r#"<div class="tab-actual-content">ready</div>"#));
    }

    #[test]
    fn empty_state_uses_default_message() {
        let mut tabs = TabController::new();
        tabs.show_empty_state(Tab::Evidence, None);
        assert!(tabs.content(Tab::Evidence).as_str().contains("No data available"));
        tabs.show_empty_state(Tab::Evidence, Some("No evidence <here>"));
        assert!(tabs.content(Tab::Evidence).as_str().contains("No evidence &lt;here&gt;"));
    }

    #[test]
    fn reset_clears_flags_and_content() {
        let mut tabs = TabController::new();
        tabs.set_loading_state(Tab::Companies, true);
        tabs.set_content(Tab::Companies, Html::text("x"));
        tabs.reset();
        assert!(!tabs.is_loading(Tab::Companies));
        assert!(tabs.content(Tab::Companies).is_empty());
    }

    #[test]
    fn tab_names_parse() {
        assert_eq!("evidence".parse::<Tab>().unwrap(), Tab::Evidence);
        assert!("Summary".parse::<Tab>().is_err());
    }
}
