use std::time::Duration;

use reqwest::{Client, RequestBuilder};

use crate::error::{AppError, AppResult, UpstreamService};

const USER_AGENT: &str = concat!("weather-web/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(service: UpstreamService, timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::upstream(service, format!("Failed to build HTTP client: {e}")))
}

/// Send a request and return the body of a successful response.
///
/// `what` names the call in error details, e.g. "search".
pub(crate) async fn fetch_body(
    request: RequestBuilder,
    service: UpstreamService,
    what: &str,
) -> AppResult<String> {
    let res = request.send().await.map_err(|e| {
        AppError::upstream(service, format!("Failed to send {service} {what} request: {e}"))
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|e| {
        AppError::upstream(service, format!("Failed to read {service} {what} response body: {e}"))
    })?;

    if !status.is_success() {
        return Err(AppError::upstream(
            service,
            format!(
                "{service} {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ),
        ));
    }

    Ok(body)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate_body("bad key"), "bad key");
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundary() {
        let body = "é".repeat(150);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 203);
    }
}
