use tokio::sync::watch;

use crate::error::LogbookError;
use crate::model::Identity;

/// Identity of the signed-in user, passed explicitly to whatever needs it.
///
/// Sign-in and sign-out are broadcast on a watch channel so long-lived
/// consumers can react to session changes.
#[derive(Debug)]
pub struct SessionContext {
    tx: watch::Sender<Option<Identity>>,
}

impl SessionContext {
    /// A context with nobody signed in.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        SessionContext { tx }
    }

    /// A context with the given identity already signed in.
    pub fn signed_in(identity: Identity) -> Self {
        let session = Self::new();
        session.sign_in(identity);
        session
    }

    pub fn sign_in(&self, identity: Identity) {
        tracing::debug!(user_id = %identity.user_id, "session signed in");
        self.tx.send_replace(Some(identity));
    }

    /// Tear down the session, returning the identity that was signed in.
    pub fn sign_out(&self) -> Option<Identity> {
        let previous = self.tx.send_replace(None);
        if let Some(identity) = &previous {
            tracing::debug!(user_id = %identity.user_id, "session signed out");
        }
        previous
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// The signed-in identity, or `AuthenticationRequired`.
    pub fn require(&self) -> Result<Identity, LogbookError> {
        self.current().ok_or(LogbookError::AuthenticationRequired)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_requires_sign_in() {
        let session = SessionContext::new();
        assert!(session.current().is_none());
        assert!(matches!(
            session.require(),
            Err(LogbookError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_sign_in_then_out() {
        let session = SessionContext::signed_in(Identity::new("user-1"));
        assert_eq!(session.require().unwrap().user_id, "user-1");

        let previous = session.sign_out().unwrap();
        assert_eq!(previous.user_id, "user-1");
        assert!(session.current().is_none());
        assert!(session.sign_out().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_out() {
        let session = SessionContext::signed_in(Identity::new("user-1"));
        let mut rx = session.subscribe();
        assert!(rx.borrow().is_some());

        session.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
