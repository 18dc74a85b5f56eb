//! Confirmation link construction

use crate::error::TeamsheetResult;

use super::service::{TokenService, DEFAULT_VALIDITY};

/// Query parameter the confirmation endpoint reads the token from
pub const TOKEN_QUERY_PARAM: &str = "token";

impl TokenService {
    /// Issue a token with the default validity and wrap it in a link to the
    /// confirmation endpoint under `base_url`
    pub fn build_confirmation_url(
        &self,
        base_url: &str,
        session_id: &str,
        subject_id: &str,
    ) -> TeamsheetResult<String> {
        let token = self.issue(session_id, subject_id, DEFAULT_VALIDITY)?;
        Ok(confirmation_url(base_url, &self.confirmation_path, &token))
    }
}

/// Join `base_url`, `path` and an already-issued token into a link
pub fn confirmation_url(base_url: &str, path: &str, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    format!(
        "{}{}?{}={}",
        base,
        path,
        TOKEN_QUERY_PARAM,
        urlencoding::encode(token)
    )
}

/// Pull the token back out of a confirmation link
pub fn token_from_url(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != TOKEN_QUERY_PARAM {
            return None;
        }
        urlencoding::decode(value).ok().map(|v| v.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SigningSecret;

    fn service() -> TokenService {
        TokenService::new(SigningSecret::new("club-secret").unwrap())
    }

    #[test]
    fn test_build_confirmation_url() {
        let svc = service();
        let url = svc
            .build_confirmation_url("https://club.example/", "s1", "a1")
            .unwrap();

        assert!(url.starts_with("https://club.example/api/attendance/confirm?token="));

        let token = token_from_url(&url).unwrap();
        let payload = svc.verify(&token).unwrap();
        assert_eq!(payload.session_id, "s1");
        assert_eq!(payload.subject_id, "a1");
    }

    #[test]
    fn test_custom_confirmation_path() {
        let svc = service().with_confirmation_path("confirm");
        let url = svc
            .build_confirmation_url("https://club.example", "s1", "a1")
            .unwrap();
        assert!(url.starts_with("https://club.example/confirm?token="));
    }

    #[test]
    fn test_confirmation_url_encodes_token() {
        let url = confirmation_url("https://club.example", "/c", "a b&c");
        assert_eq!(url, "https://club.example/c?token=a%20b%26c");
        assert_eq!(token_from_url(&url).as_deref(), Some("a b&c"));
    }

    #[test]
    fn test_token_from_url_without_token() {
        assert!(token_from_url("https://club.example/c").is_none());
        assert!(token_from_url("https://club.example/c?other=1").is_none());
        assert_eq!(
            token_from_url("https://club.example/c?x=1&token=abc#frag").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_build_rejects_empty_ids() {
        assert!(service()
            .build_confirmation_url("https://club.example", "", "a1")
            .is_err());
    }
}
