//! Per-user session map.
//!
//! Each Discord user gets their own catalog, draft and browser state. Commands copy
//! the state they need out of the map, run the transition (which may await the
//! store) and write the result back; the lock is never held across a store call.

use crate::session::{Catalog, InvoiceBrowser, InvoiceDraft};
use poise::serenity_prelude::UserId;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Interactive state of one user.
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    /// Client and service manager
    pub catalog: Option<Catalog>,
    /// Invoice being composed
    pub draft: Option<InvoiceDraft>,
    /// Saved invoice browser
    pub browser: Option<InvoiceBrowser>,
}

/// Sessions keyed by Discord user.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, UserSession>>,
}

impl SessionStore {
    /// Reads from a user's session, which is empty if the user has none yet.
    pub async fn read<T>(&self, user: UserId, f: impl FnOnce(&UserSession) -> T) -> T {
        let sessions = self.sessions.lock().await;
        match sessions.get(&user) {
            Some(session) => f(session),
            None => f(&UserSession::default()),
        }
    }

    /// Changes a user's session, creating it if needed.
    pub async fn write(&self, user: UserId, f: impl FnOnce(&mut UserSession)) {
        let mut sessions = self.sessions.lock().await;
        f(sessions.entry(user).or_default());
    }

    pub async fn catalog(&self, user: UserId) -> Option<Catalog> {
        self.read(user, |s| s.catalog.clone()).await
    }

    pub async fn put_catalog(&self, user: UserId, catalog: Catalog) {
        self.write(user, |s| s.catalog = Some(catalog)).await;
    }

    pub async fn draft(&self, user: UserId) -> Option<InvoiceDraft> {
        self.read(user, |s| s.draft.clone()).await
    }

    pub async fn put_draft(&self, user: UserId, draft: Option<InvoiceDraft>) {
        self.write(user, |s| s.draft = draft).await;
    }

    pub async fn browser(&self, user: UserId) -> Option<InvoiceBrowser> {
        self.read(user, |s| s.browser.clone()).await
    }

    pub async fn put_browser(&self, user: UserId, browser: InvoiceBrowser) {
        self.write(user, |s| s.browser = Some(browser)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let sessions = SessionStore::default();
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        let browser = InvoiceBrowser::from_invoices(vec![test_invoice_model(1, "Acme", &["2024-25"])]);
        sessions.put_browser(alice, browser).await;

        assert_eq!(sessions.browser(alice).await.map(|b| b.invoices().len()), Some(1));
        assert!(sessions.browser(bob).await.is_none());
        assert!(sessions.catalog(alice).await.is_none());
    }

    #[tokio::test]
    async fn test_writes_touch_only_their_field() {
        let sessions = SessionStore::default();
        let user = UserId::new(7);

        sessions.put_catalog(user, Catalog::default()).await;
        sessions.put_browser(user, InvoiceBrowser::default()).await;
        sessions.put_draft(user, None).await;

        assert!(sessions.catalog(user).await.is_some());
        assert!(sessions.browser(user).await.is_some());
        assert!(sessions.draft(user).await.is_none());
    }
}
