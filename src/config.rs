//! Carga de la configuración del dashboard (backend del screener + servidor local).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: Url,
    /// Token por defecto para el backend si la página no trae uno.
    pub api_token: Option<String>,
    pub server_addr: String,
    pub poll_interval: Duration,
    pub demo_dir: PathBuf,
    pub static_dir: PathBuf,
    pub open_browser: bool,
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("Valor no válido para {name}: {other}")),
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Igual que [`AppConfig::from_env`] pero con una fuente de variables arbitraria.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url_str =
            lookup("SCREENER_API_URL").unwrap_or_else(|| "http://localhost:8000".to_string());
        let api_url = Url::parse(&api_url_str)
            .with_context(|| format!("SCREENER_API_URL no es una URL válida: {api_url_str}"))?;

        let api_token = lookup("SCREENER_TOKEN").filter(|t| !t.trim().is_empty());

        let server_addr =
            lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3323".to_string());

        let poll_interval = match lookup("POLL_INTERVAL_MS") {
            Some(raw) => {
                let ms: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| anyhow!("POLL_INTERVAL_MS debe ser un entero: {raw}"))?;
                if ms == 0 {
                    return Err(anyhow!("POLL_INTERVAL_MS debe ser mayor que cero"));
                }
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(5000),
        };

        let demo_dir = PathBuf::from(lookup("DEMO_DIR").unwrap_or_else(|| "frontend/data".to_string()));
        let static_dir = PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "frontend".to_string()));

        let open_browser = match lookup("OPEN_BROWSER") {
            Some(raw) => parse_bool("OPEN_BROWSER", &raw)?,
            None => true,
        };

        Ok(Self {
            api_url,
            api_token,
            server_addr,
            poll_interval,
            demo_dir,
            static_dir,
            open_browser,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(cfg.server_addr, "127.0.0.1:3323");
        assert_eq!(cfg.poll_interval, Duration::from_millis(5000));
        assert_eq!(cfg.demo_dir, PathBuf::from("frontend/data"));
        assert!(cfg.open_browser);
        assert!(cfg.api_token.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = load(&[
            ("SCREENER_API_URL", "https://screener.example.com/v1/"),
            ("SCREENER_TOKEN", "secret"),
            ("POLL_INTERVAL_MS", "250"),
            ("OPEN_BROWSER", "false"),
        ])
        .unwrap();
        assert_eq!(cfg.api_url.path(), "/v1/");
        assert_eq!(cfg.api_token.as_deref(), Some("secret"));
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert!(!cfg.open_browser);
    }

    #[test]
    fn bad_numbers_are_configuration_errors() {
        assert!(load(&[("POLL_INTERVAL_MS", "soon")]).is_err());
        let zero = load(&[("POLL_INTERVAL_MS", "0")]).unwrap_err();
        assert!(zero.to_string().contains("mayor que cero"));
        assert!(load(&[("OPEN_BROWSER", "maybe")]).is_err());
        assert!(load(&[("SCREENER_API_URL", "not a url")]).is_err());
    }
}
