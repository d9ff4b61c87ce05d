use crate::models::SoulMateResultWithDate;
use crate::services::{ApiClient, ApiError};

/// States of the shareable result page
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// No token in the link
    InvalidLink,
    Loading,
    Found(SoulMateResultWithDate),
    /// Lookup failed or came back empty
    NotFound,
}

impl ResultView {
    /// View to show before any fetch has resolved
    pub fn initial(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Self::Loading,
            _ => Self::InvalidLink,
        }
    }

    pub fn resolve(outcome: Result<SoulMateResultWithDate, ApiError>) -> Self {
        match outcome {
            Ok(result) if !result.token.is_empty() => Self::Found(result),
            Ok(_) => Self::NotFound,
            Err(e) => {
                tracing::info!("Result lookup failed: {}", e);
                Self::NotFound
            }
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::InvalidLink => "O link parece estar incompleto ou inválido.",
            Self::Loading => "Carregando resultado...",
            Self::Found(_) => "Sua Alma Gêmea Encontrada!",
            Self::NotFound => {
                "Não conseguimos encontrar este resultado. O link pode ter expirado ou ser inválido."
            }
        }
    }
}

/// Fetch and settle the result page for a token taken from the URL
pub async fn load_result(api: &ApiClient, token: Option<&str>) -> ResultView {
    match (ResultView::initial(token), token) {
        (ResultView::Loading, Some(token)) => ResultView::resolve(api.get_result(token).await),
        (view, _) => view,
    }
}

/// Link to the stand-alone result page
pub fn share_url(origin: &str, token: &str) -> String {
    format!(
        "{}/result/{}",
        origin.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

/// Older share form handled by the root route redirect
pub fn legacy_share_url(origin: &str, token: &str) -> String {
    format!("{}?result={}", origin.trim_end_matches('/'), urlencoding::encode(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view() {
        assert_eq!(ResultView::initial(None), ResultView::InvalidLink);
        assert_eq!(ResultView::initial(Some("")), ResultView::InvalidLink);
        assert_eq!(ResultView::initial(Some("abc123")), ResultView::Loading);
    }

    #[test]
    fn test_failed_lookup_is_not_found() {
        let view = ResultView::resolve(Err(ApiError::NotFound("abc".to_string())));
        assert_eq!(view, ResultView::NotFound);
    }

    #[test]
    fn test_share_urls() {
        assert_eq!(share_url("https://alma.example/", "abc123"), "https://alma.example/result/abc123");
        assert_eq!(legacy_share_url("https://alma.example", "abc123"), "https://alma.example?result=abc123");
    }
}
