//! Fragmentos HTML seguros y escapado de texto.
//!
//! Todo lo que sale de los renderizadores es un [`Html`]: texto ya escapado o
//! plantillas estáticas. Los valores dinámicos sólo entran a través de
//! [`markup!`], que los escapa con [`ToHtml`], de modo que el escapado no depende
//! de la disciplina de quien llama.

use std::fmt;

/// Escapa texto arbitrario para insertarlo en HTML (contenido o atributos).
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Formatea una puntuación: los enteros se muestran sin parte decimal.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Fragmento de marcado ya seguro.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Html(String);

impl Html {
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Texto plano, escapado.
    pub fn text(text: impl AsRef<str>) -> Self {
        Self(escape_html(text.as_ref()))
    }

    /// Marcado construido por [`markup!`] (plantillas con argumentos ya escapados).
    #[doc(hidden)]
    pub fn trusted(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Plantilla literal sin argumentos.
    pub fn from_static(markup: &'static str) -> Self {
        Self(markup.to_string())
    }

    pub fn push(&mut self, other: impl Into<Html>) {
        self.0.push_str(&other.into().0);
    }

    pub fn push_text(&mut self, text: impl AsRef<str>) {
        self.0.push_str(&escape_html(text.as_ref()));
    }

    pub fn push_static(&mut self, markup: &'static str) {
        self.0.push_str(markup);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromIterator<Html> for Html {
    fn from_iter<I: IntoIterator<Item = Html>>(iter: I) -> Self {
        let mut out = Html::new();
        for fragment in iter {
            out.push(fragment);
        }
        out
    }
}

/// Conversión de un valor a marcado seguro dentro de [`markup!`].
pub trait ToHtml {
    fn to_html(&self) -> Html;
}

impl ToHtml for Html {
    fn to_html(&self) -> Html {
        self.clone()
    }
}

impl ToHtml for str {
    fn to_html(&self) -> Html {
        Html::text(self)
    }
}

impl ToHtml for String {
    fn to_html(&self) -> Html {
        Html::text(self)
    }
}

impl ToHtml for f64 {
    fn to_html(&self) -> Html {
        Html(format_number(*self))
    }
}

macro_rules! impl_to_html_int {
    ($($t:ty),*) => {
        $(impl ToHtml for $t {
            fn to_html(&self) -> Html {
                Html(self.to_string())
            }
        })*
    };
}

impl_to_html_int!(i32, i64, u32, u64, usize);

impl<T: ToHtml> ToHtml for Option<T> {
    fn to_html(&self) -> Html {
        self.as_ref().map(ToHtml::to_html).unwrap_or_default()
    }
}

impl<T: ToHtml + ?Sized> ToHtml for &T {
    fn to_html(&self) -> Html {
        (**self).to_html()
    }
}

/// Plantilla HTML con argumentos posicionales escapados.
///
/// Sólo se admiten argumentos posicionales: una variable capturada dentro de
/// la cadena de formato (`{var}`) no pasaría por [`ToHtml`].
#[macro_export]
macro_rules! markup {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::html::Html::trusted(format!($fmt $(, $crate::html::ToHtml::to_html(&$arg))*))
    };
}
