//! Cliente del backend del screener.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::errors::ClientError;
use crate::models::StatusResponse;
use crate::request::ScreenerRequest;

/// Operaciones que el dashboard necesita del backend.
#[async_trait]
pub trait ScreenerBackend: Send + Sync {
    /// Envía el trabajo y devuelve su `request_id`.
    async fn submit(&self, request: &ScreenerRequest, token: Option<&str>) -> Result<String, ClientError>;

    async fn status(&self, request_id: &str, token: Option<&str>) -> Result<StatusResponse, ClientError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ValidationDetail {
    #[serde(default)]
    loc: Vec<Value>,
    #[serde(default)]
    msg: String,
}

fn loc_part(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Mensajes de un cuerpo `{detail: [{loc, msg}]}`. `None` si el cuerpo no
/// tiene esa forma.
pub fn parse_validation_detail(body: &str) -> Option<Vec<String>> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;
    let details: Vec<ValidationDetail> = serde_json::from_value(body.detail?).ok()?;
    Some(
        details
            .into_iter()
            .map(|d| {
                if d.loc.len() > 1 {
                    let loc: Vec<String> = d.loc.iter().map(loc_part).collect();
                    format!("{}: {}", loc.join(", "), d.msg)
                } else {
                    d.msg
                }
            })
            .collect(),
    )
}

/// Implementación HTTP con `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpScreenerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpScreenerClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// `base/segmentos?token=...`; el token se reenvía tal cual.
    fn endpoint(&self, segments: &[&str], token: Option<&str>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport(format!("URL base no válida: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }
}

#[async_trait]
impl ScreenerBackend for HttpScreenerClient {
    async fn submit(&self, request: &ScreenerRequest, token: Option<&str>) -> Result<String, ClientError> {
        let url = self.endpoint(&["thematic-screener"], token)?;
        debug!(%url, theme = %request.theme, "submitting screener job");
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "screener submission rejected");
            return Err(match parse_validation_detail(&body) {
                Some(messages) => ClientError::Validation(messages),
                None => ClientError::Http(status.as_u16()),
            });
        }

        let body: SubmitResponse = response.json().await?;
        body.request_id
            .ok_or_else(|| ClientError::Decode("missing request_id".to_string()))
    }

    async fn status(&self, request_id: &str, token: Option<&str>) -> Result<StatusResponse, ClientError> {
        let url = self.endpoint(&["status", request_id], token)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}
