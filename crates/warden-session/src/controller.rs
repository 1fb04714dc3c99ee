// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session lifecycle: login, refresh, logout.
//!
//! # State machine
//!
//! ```text
//! Anonymous | Failed | Authenticated --login--> Authenticating --> Authenticated | Failed
//! Authenticated --refresh--> Refreshing --> Authenticated | Anonymous
//! any --logout--> Anonymous
//! ```
//!
//! # Refresh coalescing
//!
//! At most one refresh exchange is in flight. The first caller drives it; every
//! caller arriving while it runs subscribes to its outcome and receives the same
//! result. If the driving caller is dropped before the exchange finishes, the
//! waiters get [`SessionError::RefreshAbandoned`] and the controller falls back
//! to `Authenticated`.
//!
//! Every login and logout bumps an epoch. An exchange that completes after the
//! epoch moved on is discarded with [`SessionError::Superseded`], so a slow
//! refresh can never bring back a session the user already left.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use warden_core::{RoleResolver, Session, TokenValidator};

use crate::collaborator::{AuthService, Credentials, TokenPersistence};
use crate::error::{SessionError, SessionResult};
use crate::store::SessionStore;
use crate::timer::PeriodicTask;

type RefreshOutcome = Result<Arc<Session>, SessionError>;

// =============================================================================
// SessionState
// =============================================================================

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session.
    Anonymous,
    /// A login exchange is in flight.
    Authenticating,
    /// A valid session is installed.
    Authenticated,
    /// A refresh exchange is in flight.
    Refreshing,
    /// The last login failed.
    Failed,
}

impl SessionState {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Refreshing => "refreshing",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` while an exchange with the auth service is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Authenticating | Self::Refreshing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum RefreshRole {
    Driver(u64),
    Waiter(broadcast::Receiver<RefreshOutcome>),
}

struct ControllerInner {
    state: SessionState,
    epoch: u64,
    in_flight: Option<broadcast::Sender<RefreshOutcome>>,
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`SessionController`].
pub struct SessionControllerBuilder {
    auth: Arc<dyn AuthService>,
    persistence: Arc<dyn TokenPersistence>,
    resolver: RoleResolver,
    validator: TokenValidator,
}

impl SessionControllerBuilder {
    /// Sets the role resolver used for every session built.
    pub fn resolver(mut self, resolver: RoleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets the token validator (clock-skew leeway).
    pub fn validator(mut self, validator: TokenValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Restores the persisted session and builds the controller.
    ///
    /// A persisted token that is currently valid yields `Authenticated`.
    /// Anything else yields `Anonymous`, and a stale token is cleared.
    pub fn build(self) -> Arc<SessionController> {
        let persisted = match self.persistence.get_token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token, starting anonymous");
                None
            }
        };

        let (state, session) = match persisted {
            Some(token) => match self.validator.check(Some(&token)) {
                Ok(_) => {
                    let session = Session::from_token(token, &self.resolver).with_validator(self.validator);
                    info!(roles = %session.roles, "Restored persisted session");
                    (SessionState::Authenticated, session)
                }
                Err(failure) => {
                    debug!(reason = %failure, "Persisted token is not usable");
                    if let Err(e) = self.persistence.clear_token() {
                        warn!(error = %e, "Failed to clear stale token");
                    }
                    (SessionState::Anonymous, self.anonymous_session())
                }
            },
            None => (SessionState::Anonymous, self.anonymous_session()),
        };

        Arc::new(SessionController {
            auth: self.auth,
            persistence: self.persistence,
            store: Arc::new(SessionStore::new(session)),
            resolver: self.resolver,
            validator: self.validator,
            inner: Mutex::new(ControllerInner {
                state,
                epoch: 0,
                in_flight: None,
            }),
            commit: Mutex::new(()),
        })
    }

    fn anonymous_session(&self) -> Session {
        Session::anonymous(&self.resolver).with_validator(self.validator)
    }
}

// =============================================================================
// SessionController
// =============================================================================

/// Owns the session lifecycle and is the only writer of its [`SessionStore`].
///
/// Shared by `Arc`; all methods take `&self`.
pub struct SessionController {
    auth: Arc<dyn AuthService>,
    persistence: Arc<dyn TokenPersistence>,
    store: Arc<SessionStore>,
    resolver: RoleResolver,
    validator: TokenValidator,
    inner: Mutex<ControllerInner>,
    // Serializes epoch check, persistence and publish. Never held across an await.
    commit: Mutex<()>,
}

impl SessionController {
    /// Starts building a controller.
    pub fn builder(
        auth: Arc<dyn AuthService>,
        persistence: Arc<dyn TokenPersistence>,
    ) -> SessionControllerBuilder {
        SessionControllerBuilder {
            auth,
            persistence,
            resolver: RoleResolver::new(),
            validator: TokenValidator::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// The store holding the current session.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Arc<Session> {
        self.store.current()
    }

    /// The role resolver sessions are built with.
    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    /// Exchanges credentials for a session.
    ///
    /// On failure the persisted token and the current session are cleared and
    /// the state becomes `Failed`.
    pub async fn login(&self, credentials: &Credentials) -> SessionResult<Arc<Session>> {
        let (epoch, previous) = {
            let mut inner = self.inner.lock();
            if inner.state.is_busy() {
                return Err(SessionError::Busy {
                    state: inner.state.as_str(),
                });
            }
            let previous = inner.state;
            inner.state = SessionState::Authenticating;
            inner.epoch += 1;
            (inner.epoch, previous)
        };

        let mut guard = TransitionGuard::new(&self.inner, epoch, SessionState::Authenticating, previous);
        info!(username = %credentials.username, "Login started");

        let outcome = match self.auth.login(credentials).await {
            Ok(grant) => self
                .validator
                .check(Some(&grant.access_token))
                .map(|_| grant.access_token)
                .map_err(SessionError::RejectedToken),
            Err(e) => Err(SessionError::Auth(e)),
        };

        let _commit = self.commit.lock();
        {
            let mut inner = self.inner.lock();
            guard.disarm();
            if inner.epoch != epoch {
                debug!("Login result discarded, session changed meanwhile");
                return Err(SessionError::Superseded);
            }
            inner.state = match outcome {
                Ok(_) => SessionState::Authenticated,
                Err(_) => SessionState::Failed,
            };
        }

        match outcome {
            Ok(token) => {
                let session = self.install(token)?;
                info!(roles = %session.roles, "Login succeeded");
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.clear_local()?;
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Renews the current session.
    ///
    /// Only valid from `Authenticated`; a call during `Refreshing` joins the
    /// exchange already running. A failed refresh logs the user out locally
    /// and is not retried.
    pub async fn refresh(&self) -> SessionResult<Arc<Session>> {
        let role = {
            let mut inner = self.inner.lock();
            match inner.state {
                SessionState::Refreshing => match inner.in_flight.as_ref() {
                    Some(tx) => RefreshRole::Waiter(tx.subscribe()),
                    None => return Err(SessionError::RefreshAbandoned),
                },
                SessionState::Authenticated => {
                    let (tx, _) = broadcast::channel(1);
                    inner.in_flight = Some(tx);
                    inner.state = SessionState::Refreshing;
                    RefreshRole::Driver(inner.epoch)
                }
                _ => return Err(SessionError::NotAuthenticated),
            }
        };

        match role {
            RefreshRole::Waiter(mut rx) => {
                debug!("Joining in-flight refresh");
                match rx.recv().await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(SessionError::RefreshAbandoned),
                }
            }
            RefreshRole::Driver(epoch) => self.drive_refresh(epoch).await,
        }
    }

    async fn drive_refresh(&self, epoch: u64) -> SessionResult<Arc<Session>> {
        let mut guard = TransitionGuard::new(
            &self.inner,
            epoch,
            SessionState::Refreshing,
            SessionState::Authenticated,
        );

        let outcome = match self.auth.refresh().await {
            Ok(grant) => self
                .validator
                .check(Some(&grant.access_token))
                .map(|_| grant.access_token)
                .map_err(SessionError::RejectedToken),
            Err(e) => Err(SessionError::Auth(e)),
        };

        let _commit = self.commit.lock();
        let tx = {
            let mut inner = self.inner.lock();
            guard.disarm();
            if inner.epoch != epoch {
                debug!("Refresh result discarded, session changed meanwhile");
                return Err(SessionError::Superseded);
            }
            inner.state = match outcome {
                Ok(_) => SessionState::Authenticated,
                Err(_) => SessionState::Anonymous,
            };
            inner.in_flight.take()
        };

        let result: RefreshOutcome = match outcome {
            Ok(token) => self.install(token).map(|session| {
                info!(roles = %session.roles, "Session refreshed");
                session
            }),
            Err(e) => {
                warn!(error = %e, "Refresh failed, logging out");
                self.clear_local().and(Err(e))
            }
        };

        if let Some(tx) = tx {
            let _ = tx.send(result.clone());
        }
        result
    }

    /// Refreshes only if the current token expires within `lead`.
    ///
    /// Returns `Ok(None)` when nothing needed doing.
    pub async fn refresh_if_expiring(&self, lead: Duration) -> SessionResult<Option<Arc<Session>>> {
        if self.state() != SessionState::Authenticated {
            return Ok(None);
        }

        let session = self.store.current();
        if session.token.is_none() {
            return Ok(None);
        }

        let remaining = self
            .validator
            .seconds_remaining(session.token.as_deref(), Utc::now());
        match remaining {
            Some(secs) if secs > lead.as_secs() as i64 => Ok(None),
            _ => {
                debug!(remaining = ?remaining, "Token near expiry, refreshing");
                self.refresh().await.map(Some)
            }
        }
    }

    /// Checks expiry every `period` and refreshes within `lead` of it.
    ///
    /// A zero `period` is raised to [`crate::timer::MIN_PERIOD`]. Must be
    /// called from within a tokio runtime.
    pub fn spawn_expiry_refresh(self: &Arc<Self>, period: Duration, lead: Duration) -> PeriodicTask {
        let controller = Arc::clone(self);
        PeriodicTask::spawn("expiry-refresh", period, move || {
            let controller = controller.clone();
            async move {
                if let Err(e) = controller.refresh_if_expiring(lead).await {
                    warn!(error = %e, "Scheduled refresh failed");
                }
            }
        })
    }

    // -------------------------------------------------------------------------
    // Logout
    // -------------------------------------------------------------------------

    /// Ends the session. Always succeeds and may be called in any state.
    ///
    /// Local state is cleared first. The auth service is told afterwards, and
    /// only if there was a session to end; its failures are logged.
    pub async fn logout(&self) -> SessionResult<()> {
        let previous = {
            let _commit = self.commit.lock();
            let previous = {
                let mut inner = self.inner.lock();
                let previous = inner.state;
                inner.state = SessionState::Anonymous;
                inner.epoch += 1;
                if let Some(tx) = inner.in_flight.take() {
                    let _ = tx.send(Err(SessionError::Superseded));
                }
                previous
            };

            if let Err(e) = self.clear_local() {
                warn!(error = %e, "Failed to publish anonymous session");
            }
            previous
        };

        if matches!(previous, SessionState::Authenticated | SessionState::Refreshing) {
            if let Err(e) = self.auth.logout().await {
                warn!(error = %e, "Auth service logout failed");
            }
            info!("Logged out");
        } else {
            debug!(state = %previous, "Logout with no active session");
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn install(&self, token: String) -> SessionResult<Arc<Session>> {
        if let Err(e) = self.persistence.set_token(&token) {
            warn!(error = %e, "Failed to persist token");
        }
        let session = Session::from_token(token, &self.resolver).with_validator(self.validator);
        Ok(self.store.publish(session)?)
    }

    fn clear_local(&self) -> SessionResult<()> {
        if let Err(e) = self.persistence.clear_token() {
            warn!(error = %e, "Failed to clear persisted token");
        }
        if !self.store.current().is_anonymous() {
            let session = Session::anonymous(&self.resolver).with_validator(self.validator);
            self.store.publish(session)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("store", &self.store)
            .finish()
    }
}

// =============================================================================
// TransitionGuard
// =============================================================================

/// Reverts a transient state if the exchange future is dropped mid-flight.
///
/// Dropping the in-flight sender wakes refresh waiters with a closed channel.
struct TransitionGuard<'a> {
    inner: &'a Mutex<ControllerInner>,
    epoch: u64,
    transient: SessionState,
    fallback: SessionState,
    armed: bool,
}

impl<'a> TransitionGuard<'a> {
    fn new(
        inner: &'a Mutex<ControllerInner>,
        epoch: u64,
        transient: SessionState,
        fallback: SessionState,
    ) -> Self {
        Self {
            inner,
            epoch,
            transient,
            fallback,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.epoch == self.epoch && inner.state == self.transient {
            warn!(state = %self.transient, "Exchange abandoned, reverting to {}", self.fallback);
            inner.state = self.fallback;
            inner.in_flight = None;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::TokenGrant;
    use crate::error::AuthServiceError;
    use crate::persistence::MemoryTokenStore;
    use async_trait::async_trait;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn token(offset_secs: i64, role: &str) -> String {
        let exp = Utc::now().timestamp() + offset_secs;
        encode(
            &Header::default(),
            &json!({ "exp": exp, "role": role }),
            &EncodingKey::from_secret(b"test"),
        )
        .unwrap()
    }

    #[derive(Default)]
    struct ScriptedAuth {
        logins: Mutex<VecDeque<Result<TokenGrant, AuthServiceError>>>,
        refreshes: Mutex<VecDeque<Result<TokenGrant, AuthServiceError>>>,
        refresh_calls: AtomicUsize,
        logout_calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedAuth {
        fn login_ok(self, token: String) -> Self {
            self.logins.lock().push_back(Ok(TokenGrant::new(token)));
            self
        }

        fn login_err(self, err: AuthServiceError) -> Self {
            self.logins.lock().push_back(Err(err));
            self
        }

        fn refresh_ok(self, token: String) -> Self {
            self.refreshes.lock().push_back(Ok(TokenGrant::new(token)));
            self
        }

        fn refresh_err(self, err: AuthServiceError) -> Self {
            self.refreshes.lock().push_back(Err(err));
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl AuthService for ScriptedAuth {
        async fn login(&self, _credentials: &Credentials) -> Result<TokenGrant, AuthServiceError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.logins.lock().pop_front();
            next.unwrap_or_else(|| Err(AuthServiceError::other("no scripted login")))
        }

        async fn refresh(&self) -> Result<TokenGrant, AuthServiceError> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.refreshes.lock().pop_front();
            next.unwrap_or_else(|| Err(AuthServiceError::other("no scripted refresh")))
        }

        async fn logout(&self) -> Result<(), AuthServiceError> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn controller(auth: ScriptedAuth, persisted: Option<String>) -> (Arc<SessionController>, Arc<ScriptedAuth>, Arc<MemoryTokenStore>) {
        let auth = Arc::new(auth);
        let store = Arc::new(match persisted {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let controller = SessionController::builder(auth.clone(), store.clone()).build();
        (controller, auth, store)
    }

    #[tokio::test]
    async fn test_startup_with_valid_token() {
        let t = token(3600, "Admin");
        let (c, _, _) = controller(ScriptedAuth::default(), Some(t.clone()));

        assert_eq!(c.state(), SessionState::Authenticated);
        assert!(c.session().is_authenticated());
        assert!(c.session().roles.contains("admin"));
    }

    #[tokio::test]
    async fn test_startup_with_expired_token_clears_it() {
        let (c, _, store) = controller(ScriptedAuth::default(), Some(token(-1, "admin")));

        assert_eq!(c.state(), SessionState::Anonymous);
        assert!(c.session().is_anonymous());
        assert_eq!(store.get_token().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_success() {
        let t = token(3600, "manager");
        let (c, _, store) = controller(ScriptedAuth::default().login_ok(t.clone()), None);

        let session = c.login(&Credentials::new("ops", "pw")).await.unwrap();
        assert_eq!(c.state(), SessionState::Authenticated);
        assert!(session.roles.contains("manager"));
        assert_eq!(store.get_token().unwrap(), Some(t));
    }

    #[tokio::test]
    async fn test_login_failure_clears_session() {
        let auth = ScriptedAuth::default()
            .login_ok(token(3600, "user"))
            .login_err(AuthServiceError::invalid_credentials("nope"));
        let (c, _, store) = controller(auth, None);

        c.login(&Credentials::new("ops", "pw")).await.unwrap();
        let err = c.login(&Credentials::new("ops", "bad")).await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(c.state(), SessionState::Failed);
        assert!(c.session().is_anonymous());
        assert_eq!(store.get_token().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_rejects_expired_grant() {
        let (c, _, _) = controller(ScriptedAuth::default().login_ok(token(-10, "user")), None);

        let err = c.login(&Credentials::new("ops", "pw")).await.unwrap_err();
        assert!(matches!(err, SessionError::RejectedToken(ref f) if f.is_expired()));
        assert_eq!(c.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn test_refresh_requires_authentication() {
        let (c, auth, _) = controller(ScriptedAuth::default(), None);
        assert_eq!(c.refresh().await.unwrap_err(), SessionError::NotAuthenticated);
        assert_eq!(auth.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_forces_logout() {
        let auth = ScriptedAuth::default().refresh_err(AuthServiceError::refresh_rejected("revoked"));
        let (c, auth, store) = controller(auth, Some(token(3600, "user")));

        let err = c.refresh().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(c.state(), SessionState::Anonymous);
        assert_eq!(store.get_token().unwrap(), None);
        assert!(!c.session().is_authenticated());
        assert_eq!(auth.logout_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_coalesces() {
        let auth = ScriptedAuth::default()
            .refresh_ok(token(7200, "admin"))
            .with_delay(Duration::from_millis(50));
        let (c, auth, _) = controller(auth, Some(token(60, "user")));

        let (a, b) = tokio::join!(c.refresh(), c.refresh());
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(auth.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.id, b.id);
        assert!(a.roles.contains("admin"));
        assert_eq!(c.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_logout_during_refresh_supersedes() {
        let auth = ScriptedAuth::default()
            .refresh_ok(token(7200, "admin"))
            .with_delay(Duration::from_millis(50));
        let (c, _, store) = controller(auth, Some(token(60, "user")));

        let refresh = c.refresh();
        let logout = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            c.logout().await
        };
        let (refreshed, logged_out) = tokio::join!(refresh, logout);

        assert_eq!(refreshed.unwrap_err(), SessionError::Superseded);
        assert!(logged_out.is_ok());
        assert_eq!(c.state(), SessionState::Anonymous);
        assert!(c.session().is_anonymous());
        assert_eq!(store.get_token().unwrap(), None);
    }

    #[tokio::test]
    async fn test_abandoned_refresh_reverts() {
        let auth = ScriptedAuth::default()
            .refresh_ok(token(7200, "admin"))
            .with_delay(Duration::from_secs(60));
        let (c, _, _) = controller(auth, Some(token(3600, "user")));

        let driver = tokio::time::timeout(Duration::from_millis(10), c.refresh()).await;
        assert!(driver.is_err());
        assert_eq!(c.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (c, auth, store) = controller(ScriptedAuth::default(), Some(token(3600, "user")));

        c.logout().await.unwrap();
        c.logout().await.unwrap();

        assert_eq!(c.state(), SessionState::Anonymous);
        assert_eq!(store.get_token().unwrap(), None);
        assert_eq!(auth.logout_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_if_expiring() {
        let auth = ScriptedAuth::default().refresh_ok(token(7200, "admin"));
        let (c, auth, _) = controller(auth, Some(token(3600, "user")));

        assert!(c.refresh_if_expiring(Duration::from_secs(60)).await.unwrap().is_none());
        assert_eq!(auth.refresh_calls.load(Ordering::SeqCst), 0);

        let refreshed = c.refresh_if_expiring(Duration::from_secs(4000)).await.unwrap();
        assert!(refreshed.is_some());
        assert_eq!(auth.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_refresh_with_zero_period() {
        let auth = ScriptedAuth::default().refresh_ok(token(7200, "admin"));
        let (c, auth, _) = controller(auth, Some(token(3600, "user")));

        let task = c.spawn_expiry_refresh(Duration::ZERO, Duration::from_secs(4000));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(auth.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(c.session().roles.contains("admin"));
        assert_eq!(c.state(), SessionState::Authenticated);
        task.cancel();
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Refreshing.to_string(), "refreshing");
        assert!(SessionState::Authenticating.is_busy());
        assert!(!SessionState::Failed.is_busy());
    }
}
