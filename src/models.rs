//! Modelos de dominio: informe del screener, estado de los trabajos y
//! configuración visible de la última ejecución.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Mapa que conserva el orden de las claves tal y como llegan en el JSON.
///
/// Ese orden es el criterio de desempate de todas las ordenaciones estables
/// (compañías con la misma puntuación, temas con el mismo total).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserta o reemplaza conservando la posición original de la clave.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("un objeto JSON")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Puntuación temática de una compañía.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyScoring {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub composite_score: f64,
    #[serde(default)]
    pub themes: OrderedMap<f64>,
    #[serde(default)]
    pub motivation: Option<String>,
}

impl CompanyScoring {
    /// Temas con puntuación positiva, en el orden del informe.
    pub fn active_themes(&self) -> impl Iterator<Item = (&str, f64)> {
        self.themes.iter().filter(|(_, s)| **s > 0.0).map(|(t, s)| (t, *s))
    }
}

/// Identificador de nodo de la taxonomía: el backend lo emite como número,
/// pero se aceptan también cadenas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(i64),
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{n}"),
            NodeId::Text(s) => f.write_str(s),
        }
    }
}

/// Nodo de la taxonomía del tema (árbol sin ciclos, raíz única).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub node: NodeId,
    pub label: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub children: Option<Vec<TaxonomyNode>>,
}

impl TaxonomyNode {
    pub fn children(&self) -> &[TaxonomyNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn keywords(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }
}

/// Fragmento de evidencia que respalda una asociación compañía/tema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    #[serde(default)]
    pub time_period: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub motivation: String,
    #[serde(default)]
    pub theme: String,
}

/// Informe completo de un trabajo terminado. Inmutable tras su recepción.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub theme_scoring: OrderedMap<CompanyScoring>,
    #[serde(default)]
    pub theme_taxonomy: Option<TaxonomyNode>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Vec<EvidenceRecord>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Report {
    /// Suma de la puntuación de cada tema sobre todas las compañías, ordenada
    /// de mayor a menor. Empates: orden de primera aparición en el informe.
    pub fn theme_totals(&self) -> Vec<(String, f64)> {
        let mut totals: OrderedMap<f64> = OrderedMap::new();
        for (_, scoring) in self.theme_scoring.iter() {
            for (theme, score) in scoring.themes.iter() {
                let current = totals.get(theme).copied().unwrap_or(0.0);
                totals.insert(theme, current + score);
            }
        }
        let mut sorted: Vec<(String, f64)> = totals
            .iter()
            .map(|(theme, total)| (theme.to_string(), *total))
            .collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
        sorted
    }

    /// Compañías por puntuación compuesta descendente (orden estable).
    pub fn companies_by_score(&self) -> Vec<(&str, &CompanyScoring)> {
        let mut companies: Vec<_> = self.theme_scoring.iter().collect();
        companies.sort_by(|a, b| b.1.composite_score.total_cmp(&a.1.composite_score));
        companies
    }

    /// Máxima puntuación de tema individual en todo el informe.
    pub fn max_theme_score(&self) -> f64 {
        self.theme_scoring
            .iter()
            .flat_map(|(_, s)| s.themes.iter().map(|(_, v)| *v))
            .fold(0.0, f64::max)
    }
}

/// Estado de un trabajo en el backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[serde(alias = "queued")]
    Pending,
    #[serde(alias = "in_progress")]
    Running,
    Completed,
    Failed,
}

/// Respuesta de `GET /status/{request_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub logs: Option<Vec<String>>,
    #[serde(default)]
    pub log: Option<String>,
    #[serde(default)]
    pub report: Option<Report>,
}

/// Lista pública de compañías gestionada por el servidor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    pub id: String,
    pub name: String,
}

/// Watchlists públicas disponibles en el selector del formulario.
pub fn default_watchlists() -> Vec<Watchlist> {
    [
        ("33d6f577-9256-4a53-944f-09127e42fdc2", "Top 100 UK"),
        ("9baef470-8cf5-46fa-b30a-352bcb35cd94", "Top 50 Europe"),
        ("44118802-9104-4265-b97a-2e6d88d74893", "Top 100 US"),
        ("8453c26f-47c5-4e78-b5c8-acf245caccad", "Top 40 Germany"),
        ("9fb6ac2d-a552-4dbb-b62f-8657ef18bf29", "Top 40 France"),
        ("5b78837c-343d-4559-8f06-98668b09d1df", "Dow 30"),
        ("402acbcd-f1d8-4a55-997a-598819be0bbf", "Nasdaq 100"),
        ("814d0944-a2c1-44f6-8b42-a70c0795428e", "Magnificent 7"),
    ]
    .into_iter()
    .map(|(id, name)| Watchlist {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

/// Parámetros de la última ejecución mostrados en la insignia y en
/// la tarjeta "At a Glance".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConfig {
    pub theme: String,
    /// Nombre visible del universo (o el identificador tal cual).
    pub companies: String,
    pub is_demo: bool,
    pub run_at: DateTime<Utc>,
}

impl CurrentConfig {
    pub fn new(theme: impl Into<String>, companies: impl Into<String>, is_demo: bool) -> Self {
        Self {
            theme: theme.into(),
            companies: companies.into(),
            is_demo,
            run_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "theme_scoring": {
            "Zeta Corp": {"ticker": "ZZZ", "industry": "Tech", "composite_score": 10,
                          "themes": {"Chips": 6, "Cloud": 4}, "motivation": "m"},
            "Alpha Inc": {"ticker": null, "industry": "Retail", "composite_score": 5,
                          "themes": {"Cloud": 5}, "motivation": null},
            "Mid Ltd": {"ticker": "MID", "industry": "Tech", "composite_score": 10,
                        "themes": {"Chips": 0}, "motivation": "x"}
        },
        "theme_taxonomy": {"node": 1, "label": "Root", "summary": null, "children": []},
        "content": null
    }"#;

    #[test]
    fn keeps_json_key_order() {
        let report: Report = serde_json::from_str(SAMPLE).unwrap();
        let names: Vec<_> = report.theme_scoring.keys().collect();
        assert_eq!(names, vec!["Zeta Corp", "Alpha Inc", "Mid Ltd"]);
        assert!(report.content.is_empty());
    }

    #[test]
    fn theme_totals_sum_across_companies() {
        let report: Report = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(
            report.theme_totals(),
            vec![("Cloud".to_string(), 9.0), ("Chips".to_string(), 6.0)]
        );
    }

    #[test]
    fn companies_by_score_is_stable_on_ties() {
        let report: Report = serde_json::from_str(SAMPLE).unwrap();
        let order: Vec<_> = report.companies_by_score().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["Zeta Corp", "Mid Ltd", "Alpha Inc"]);
    }

    #[test]
    fn backend_status_aliases_are_accepted() {
        let queued: StatusResponse = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        let running: StatusResponse =
            serde_json::from_str(r#"{"status":"in_progress","logs":["a"]}"#).unwrap();
        assert_eq!(queued.status, JobStatus::Pending);
        assert_eq!(running.status, JobStatus::Running);
    }
}
