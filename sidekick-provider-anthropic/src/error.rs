//! HTTP and transport error mapping.

use std::time::Duration;

use sidekick_types::ProviderError;

/// Map a `reqwest` transport error onto [`ProviderError`].
pub fn map_reqwest_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(Duration::from_secs(0))
    } else if error.is_connect() || error.is_request() {
        ProviderError::Network(Box::new(error))
    } else {
        ProviderError::Other(Box::new(error))
    }
}

/// Map a non-success HTTP status plus response body onto [`ProviderError`].
pub fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::Authentication(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        429 => ProviderError::RateLimit { retry_after: None },
        400 | 422 => ProviderError::InvalidRequest(body.to_string()),
        500..=599 => ProviderError::ServiceUnavailable(format!("{status}: {body}")),
        _ => ProviderError::InvalidRequest(format!("{status}: {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_authentication() {
        assert!(matches!(
            map_http_status(reqwest::StatusCode::UNAUTHORIZED, "bad key"),
            ProviderError::Authentication(_)
        ));
    }

    #[test]
    fn rate_limit_maps_retryable() {
        let err = map_http_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = map_http_status(reqwest::StatusCode::BAD_GATEWAY, "upstream");
        assert!(err.is_retryable());
    }
}
