use url::Url;

use crate::config::EndpointConfig;
use crate::session::errors::SessionError;

/// Full-page navigation performed by the host.
pub trait Navigator: Send + Sync + 'static {
    fn assign(&self, url: &str);
}

/// Builds the SSO redirect. `exit` asks the SSO page to end its own session as well.
pub fn sso_redirect_url(endpoints: &EndpointConfig, exit: bool) -> Result<Url, SessionError> {
    let mut url = Url::parse(&endpoints.sso_url)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("url", &endpoints.callback_url);
        query.append_pair("scope", &endpoints.scope);
        if exit {
            query.append_pair("exit", "1");
        }
    }
    Ok(url)
}

/// Extracts the `refreshToken` query parameter from the URL the SSO page redirected to.
pub fn refresh_token_from_callback(callback_url: &str) -> Result<String, SessionError> {
    let url = Url::parse(callback_url)?;
    url.query_pairs()
        .find(|(name, _)| name == "refreshToken")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(SessionError::MissingCallbackToken)
}
