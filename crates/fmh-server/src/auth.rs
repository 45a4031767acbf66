//! Bearer token authentication.
//!
//! Extracts `Authorization: Bearer <token>` and resolves it to an
//! [`Identity`] through the store's API tokens.

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use fmh_core::model::Identity;
use fmh_core::store::IdentityStore;

use crate::error::ApiError;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller's identity, or `Unauthorized`.
pub async fn authenticate<S>(store: Arc<S>, headers: &HeaderMap) -> Result<Identity, ApiError>
where
    S: IdentityStore + 'static,
{
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?.to_string();

    let resolved = tokio::task::spawn_blocking(move || store.resolve_token(&token))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    match resolved {
        Some(identity) => Ok(identity),
        None => {
            tracing::warn!("rejected unknown bearer token");
            Err(ApiError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use fmh_core::store::SqliteStore;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_prefix_required() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_issued_token_authenticates() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let token = store
            .issue_token(&Identity::new("user-1").with_email("a@b.ch"))
            .unwrap();

        let identity = authenticate(Arc::clone(&store), &headers(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.email.as_deref(), Some("a@b.ch"));

        let err = authenticate(store, &headers("Bearer not-a-token"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
