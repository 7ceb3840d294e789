//! Panel de logs del trabajo en curso.

use crate::html::Html;
use crate::markup;
use crate::models::StatusResponse;

/// Clase de color de una línea según su contenido (sin distinguir mayúsculas).
pub fn log_line_class(line: &str) -> &'static str {
    let lower = line.to_lowercase();
    if lower.contains("error") {
        "text-red-400"
    } else if lower.contains("success") {
        "text-green-400"
    } else if lower.contains("info") {
        "text-sky-400"
    } else {
        "text-zinc-300"
    }
}

pub fn render_log_lines(status: &StatusResponse) -> Html {
    match (&status.logs, &status.log) {
        (Some(lines), _) => lines
            .iter()
            .map(|line| {
                markup!(
                    r#"<div class="log-line {}">{}</div>"#,
                    Html::from_static(log_line_class(line)),
                    line
                )
            })
            .collect(),
        (None, Some(log)) => markup!(r#"<div class="log-line whitespace-pre-wrap">{}</div>"#, log),
        (None, None) => Html::from_static(r#"<div class="log-line text-zinc-500">No logs yet.</div>"#),
    }
}

/// Error de transporte durante el sondeo; el sondeo continúa.
pub fn render_status_error(message: &str) -> Html {
    markup!(r#"<div class="log-line log-error text-red-400">❌ Status Error: {}</div>"#, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;

    fn status(logs: Option<Vec<&str>>, log: Option<&str>) -> StatusResponse {
        StatusResponse {
            request_id: Some("r1".into()),
            last_updated: None,
            status: JobStatus::Running,
            logs: logs.map(|l| l.into_iter().map(String::from).collect()),
            log: log.map(String::from),
            report: None,
        }
    }

    #[test]
    fn colours_follow_keywords_in_priority_order() {
        assert_eq!(log_line_class("ERROR while fetching"), "text-red-400");
        assert_eq!(log_line_class("Success: info saved"), "text-green-400");
        assert_eq!(log_line_class("Info: starting"), "text-sky-400");
        assert_eq!(log_line_class("plain"), "text-zinc-300");
        assert_eq!(log_line_class("info about an error"), "text-red-400");
    }

    #[test]
    fn lines_are_escaped_and_wrapped() {
        let html = render_log_lines(&status(Some(vec!["Info: <start>", "done"]), None)).into_string();
        assert_eq!(
            html,
            r#"<div class="log-line text-sky-400">Info: &lt;start&gt;</div><div class="log-line text-zinc-300">done</div>"#
        );
    }

    #[test]
    fn falls_back_to_single_log_then_placeholder() {
        let html = render_log_lines(&status(None, Some("raw log")));
        assert!(html.as_str().contains("raw log"));
        let html = render_log_lines(&status(None, None));
        assert!(html.as_str().contains("No logs yet."));
    }

    #[test]
    fn status_error_is_prefixed() {
        let html = render_status_error("connection refused");
        assert!(html.as_str().contains("❌ Status Error: connection refused"));
    }
}
