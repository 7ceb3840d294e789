//! Fragmentos HTML del dashboard.

pub mod chips;
pub mod company_cards;
pub mod config_badge;
pub mod dashboard_cards;
pub mod evidence_table;
pub mod heatmap;
pub mod logs;
pub mod output;
pub mod page;
pub mod taxonomy;
