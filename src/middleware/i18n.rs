// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Idiomas suportados nas mensagens de erro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Pt,
    En,
}

impl Locale {
    /// Escolhe o primeiro idioma suportado do cabeçalho Accept-Language.
    pub fn from_accept_language(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .iter()
            // "pt-BR" -> "pt", "en-US" -> "en"
            .filter_map(|tag| tag.split('-').next())
            .find_map(|lang| match lang.to_ascii_lowercase().as_str() {
                "pt" => Some(Locale::Pt),
                "en" => Some(Locale::En),
                _ => None,
            })
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_accept_language)
            .unwrap_or_default();

        Ok(locale)
    }
}
