//! Works out where to send a visitor after they log in.

use axum::http::{HeaderMap, Uri};
use tracing::{error, warn};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN_VIEW && !endpoints::is_api_path(path)
}

/// Reduce `raw_url` to a path and query on this site.
///
/// Returns `None` for absolute URLs, protocol relative URLs, API routes and
/// the log-in page itself, so that a crafted link cannot send a visitor
/// somewhere else after logging in.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that returns the visitor to what they asked for.
///
/// For HTMX requests the page the visitor is looking at (the `HX-Current-URL`
/// header) is used, since the request URI is an API route. Falls back to the
/// home page when no safe target can be found.
pub fn build_log_in_redirect_url(uri: &Uri, headers: &HeaderMap) -> String {
    let redirect_target = if endpoints::is_api_path(uri.path()) {
        redirect_target_from_hx_headers(headers)
    } else {
        uri.path_and_query()
            .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
    };

    let redirect_target = redirect_target.unwrap_or_else(|| {
        warn!("No safe redirect URL for {uri}. Falling back to home page.");
        endpoints::HOME_VIEW.to_owned()
    });

    match serde_urlencoded::to_string([("redirect_url", &redirect_target)]) {
        Ok(param) => format!("{}?{}", endpoints::LOG_IN_VIEW, param),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

pub(crate) fn is_hx_request(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"))
}

fn redirect_target_from_hx_headers(headers: &HeaderMap) -> Option<String> {
    if !is_hx_request(headers) {
        warn!("Missing HX-Request header for API request.");
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;
    // HX-Current-URL is absolute, so only keep the part that points into this site.
    let path_and_query = current_url
        .parse::<Uri>()
        .ok()?
        .path_and_query()?
        .as_str()
        .to_owned();

    let redirect_url = normalize_redirect_url(&path_and_query);
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
