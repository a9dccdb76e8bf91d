//! services/client/src/app/session.rs
//!
//! The session/identity holder. It owns the current identity and a loading
//! flag, restores the session on startup, and signs users in and out. When the
//! auth backend is unreachable it falls back to the mirrored identity and to
//! the built-in fallback accounts.
//!
//! Every identity-changing operation takes a ticket from one shared guard, so
//! an older restore or sign-in that completes late never overwrites the result
//! of a newer one.

use quiz_core::domain::{Identity, Registration};
use quiz_core::guard::StaleGuard;
use quiz_core::ports::{AuthService, MirrorStorage, PortResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::adapters::catalogue::{find_fallback_account, sample_history};
use crate::adapters::mirror::{clear_mirrors, read_identity, write_history, write_identity};
use crate::app::state::AppState;

#[derive(Debug)]
struct SessionState {
    identity: Option<Identity>,
    loading: bool,
}

pub struct SessionHolder {
    auth: Arc<dyn AuthService>,
    mirror: Arc<dyn MirrorStorage>,
    state: Mutex<SessionState>,
    guard: StaleGuard,
    /// Set once the "no active session" line has been logged by this holder.
    reported_no_session: AtomicBool,
}

impl SessionHolder {
    /// A holder with no identity, loading until the first `restore` completes.
    pub fn new(app: &AppState) -> Self {
        Self {
            auth: app.auth.clone(),
            mirror: app.mirror.clone(),
            state: Mutex::new(SessionState {
                identity: None,
                loading: true,
            }),
            guard: StaleGuard::new(),
            reported_no_session: AtomicBool::new(false),
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.lock().identity.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Asks the auth service who is signed in, falling back to the mirrored
    /// identity. Returns the identity held afterwards.
    pub async fn restore(&self) -> Option<Identity> {
        let ticket = self.guard.issue();
        self.lock().loading = true;

        let identity = match self.auth.current_user().await {
            Ok(identity) => Some(identity),
            Err(e) if e.is_unauthorized() => {
                if !self.reported_no_session.swap(true, Ordering::SeqCst) {
                    info!("No active session.");
                }
                self.mirrored_identity()
            }
            Err(e) => {
                error!("Failed to restore the session: {}", e);
                self.mirrored_identity()
            }
        };

        self.guard
            .apply_if_current(ticket, identity, |identity| self.lock().identity = identity);
        self.lock().loading = false;
        self.identity()
    }

    /// Signs in against the backend, or against a fallback account when the
    /// backend rejects or cannot be reached. Never fails; `false` means the
    /// credentials matched nothing.
    pub async fn sign_in(&self, account_id: &str, password: &str) -> bool {
        let ticket = self.guard.issue();

        let (identity, fallback) = match self.auth.login(account_id, password).await {
            Ok(identity) => (identity, false),
            Err(e) => match find_fallback_account(account_id, password) {
                Some(account) => {
                    warn!("Login failed ({}); using a local fallback account.", e);
                    (account.identity(), true)
                }
                None => {
                    warn!("Login failed: {}", e);
                    return false;
                }
            },
        };

        let applied = self.guard.apply_if_current(ticket, identity, |identity| {
            if fallback {
                self.seed_mirror(&identity);
            }
            self.lock().identity = Some(identity);
        });
        if applied.is_none() {
            debug!("Sign-in superseded by a newer identity operation.");
        }
        true
    }

    /// Logs out on the backend if possible, then forgets the identity and the
    /// mirrored data regardless. A sign-in or restore issued while the logout
    /// is in flight wins, and nothing is cleared.
    pub async fn sign_out(&self) {
        let ticket = self.guard.issue();
        if let Err(e) = self.auth.logout().await {
            error!("Logout failed: {}", e);
        }

        let cleared = self.guard.apply_if_current(ticket, (), |()| {
            self.lock().identity = None;
            if let Err(e) = clear_mirrors(self.mirror.as_ref()) {
                warn!("Failed to clear the local mirror: {}", e);
            }
        });
        if cleared.is_none() {
            debug!("Sign-out superseded by a newer identity operation.");
        }
    }

    /// Validates the form locally, creates the account, then signs in with it.
    pub async fn register(&self, registration: &Registration) -> PortResult<bool> {
        registration.validate()?;
        self.auth.join(registration).await?;
        info!("Account created for {}.", registration.account_id);
        Ok(self
            .sign_in(&registration.account_id, &registration.password)
            .await)
    }

    /// Whether the backend still accepts the session cookie. A 401 reads as `false`.
    pub async fn validate_session(&self) -> PortResult<bool> {
        self.auth.validate_session().await
    }

    pub async fn check_account_available(&self, account_id: &str) -> PortResult<bool> {
        self.auth.is_account_available(account_id).await
    }

    fn mirrored_identity(&self) -> Option<Identity> {
        match read_identity(self.mirror.as_ref()) {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Ignoring unreadable mirrored identity: {}", e);
                None
            }
        }
    }

    fn seed_mirror(&self, identity: &Identity) {
        let seeded = write_identity(self.mirror.as_ref(), identity)
            .and_then(|_| write_history(self.mirror.as_ref(), &sample_history(&identity.id)));
        if let Err(e) = seeded {
            warn!("Failed to mirror the fallback account: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // The state is plain data; a panic elsewhere cannot leave it half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
