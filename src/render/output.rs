//! Banner de errores bajo el formulario.

use crate::errors::{ClientError, SubmitError};
use crate::html::Html;
use crate::markup;

pub fn render_error_banner(message: &str) -> Html {
    markup!(r#"<span class="error">❌ Error: {}</span>"#, message)
}

/// Banner para un envío rechazado. Los errores de validación del backend se
/// muestran uno por línea.
pub fn render_submit_error(err: &SubmitError) -> Html {
    match err {
        SubmitError::Backend(ClientError::Validation(messages)) => {
            let mut lines = Html::from_static("Form submission error:");
            for message in messages {
                lines.push(markup!("<br>{}", message));
            }
            markup!(r#"<span class="error">❌ Error: {}</span>"#, lines)
        }
        SubmitError::DateRange(message) => markup!(r#"<span class="error">❌ {}</span>"#, message),
        other => render_error_banner(&other.to_string()),
    }
}
