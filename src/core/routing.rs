use url::Url;

/// Pages of the visitor-facing site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRoute {
    Home,
    /// `None` when the path carries no token
    Result(Option<String>),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(ClientRoute),
    /// Replace the current location before rendering
    Redirect(String),
}

/// Map a request path (with optional query) to the page to show
///
/// `/?result=<token>` is the legacy share link and is rewritten to
/// `/result/<token>`. Query values decode the way browsers do, so `+`
/// reads as a space.
pub fn resolve(path_and_query: &str) -> Resolution {
    let Some(url) = site_url(path_and_query) else {
        return Resolution::Render(ClientRoute::NotFound);
    };

    let path = url.path();
    if path == "/" {
        if let Some(token) = shared_token(&url) {
            return Resolution::Redirect(format!("/result/{}", urlencoding::encode(&token)));
        }
        return Resolution::Render(ClientRoute::Home);
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed == "/result" {
        return Resolution::Render(ClientRoute::Result(None));
    }
    if let Some(rest) = trimmed.strip_prefix("/result/") {
        if rest.contains('/') {
            return Resolution::Render(ClientRoute::NotFound);
        }
        let token = urlencoding::decode(rest)
            .map(|t| t.into_owned())
            .unwrap_or_else(|_| rest.to_string());
        return Resolution::Render(ClientRoute::Result(Some(token)));
    }

    Resolution::Render(ClientRoute::NotFound)
}

/// Resolve a site-relative reference against a placeholder origin
fn site_url(path_and_query: &str) -> Option<Url> {
    let base = Url::parse("http://localhost/").ok()?;
    match base.join(path_and_query) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Unroutable path {:?}: {}", path_and_query, e);
            None
        }
    }
}

fn shared_token(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "result")
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}
