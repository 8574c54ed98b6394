use chrono::{DateTime, Utc};

use crate::client::{ApiClient, RequestOptions};
use crate::session::errors::SessionError;
use crate::session::types::{
    AccessTokenClaims, ExchangeResult, RefreshContext, RefreshJwtTokenResponse, RefreshRequest,
    User,
};
use crate::utils::base64_decode_lenient;

/// Trades a refresh token for a fresh access token at the identity service.
///
/// The call is made with `skip_auth`, so it never carries a bearer and never triggers
/// the client's own refresh path. A refused or failed exchange (any HTTP error, a transport
/// failure, a missing `jwt`) is `Ok(None)`. An access token that was issued but cannot be
/// decoded is `Err(SessionError::MalformedToken)`.
pub async fn exchange_refresh_token(
    client: &ApiClient,
    refresh_token: &str,
) -> Result<Option<ExchangeResult>, SessionError> {
    let url = client.endpoints().refresh_endpoint();
    let request = RefreshRequest {
        refresh_token,
        context: RefreshContext {
            skip_authorization: true,
        },
    };

    let response: RefreshJwtTokenResponse = match client
        .post(&url, &request, RequestOptions::skip_auth())
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Refresh token exchange failed: {}", e);
            return Ok(None);
        }
    };

    if response.jwt.is_empty() {
        tracing::warn!("Refresh token exchange returned an empty jwt");
        return Ok(None);
    }

    let claims = decode_access_token(&response.jwt)?;
    let refresh_expires = response
        .refresh_expires_at
        .as_deref()
        .and_then(parse_expiry);

    Ok(Some(ExchangeResult {
        user: User::from(&claims),
        claims,
        access_token: response.jwt,
        refresh_expires_at: response.refresh_expires_at,
        refresh_expires,
    }))
}

/// Decodes the claims in the middle segment of an access token.
///
/// The signature is not verified here; the backend checks it on every call.
pub fn decode_access_token(token: &str) -> Result<AccessTokenClaims, SessionError> {
    let body = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| SessionError::MalformedToken("missing body segment".to_string()))?;

    let bytes =
        base64_decode_lenient(body).map_err(|e| SessionError::MalformedToken(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| SessionError::MalformedToken(e.to_string()))
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Unparsable refreshExpiresAt {:?}: {}", raw, e);
            None
        }
    }
}
