//! Informes de demostración servidos desde disco, sin pasar por el backend.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemoReport {
    SupplyChain,
    AiAutomation,
    ClimateTech,
}

impl DemoReport {
    pub const ALL: [DemoReport; 3] = [
        DemoReport::SupplyChain,
        DemoReport::AiAutomation,
        DemoReport::ClimateTech,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            DemoReport::SupplyChain => "supply-chain",
            DemoReport::AiAutomation => "ai-automation",
            DemoReport::ClimateTech => "climate-tech",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DemoReport::SupplyChain => "example.json",
            DemoReport::AiAutomation => "example3.json",
            DemoReport::ClimateTech => "example2.json",
        }
    }

    pub fn theme(self) -> &'static str {
        match self {
            DemoReport::SupplyChain => "Supply Chain Reshaping",
            DemoReport::AiAutomation => "AI & Automation",
            DemoReport::ClimateTech => "Climate Technology",
        }
    }

    pub fn universe(self) -> &'static str {
        match self {
            DemoReport::SupplyChain | DemoReport::ClimateTech => "Top 100 US Companies",
            DemoReport::AiAutomation => "Nasdaq 100",
        }
    }

    /// Lee y decodifica el informe desde `dir`.
    pub async fn load(self, dir: &Path) -> Result<Report> {
        let path = dir.join(self.file_name());
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("No se pudo leer el informe de demo {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Informe de demo inválido: {}", path.display()))
    }
}

impl FromStr for DemoReport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DemoReport::ALL
            .into_iter()
            .find(|demo| demo.slug() == s)
            .ok_or_else(|| format!("Demo desconocida: {s}"))
    }
}
