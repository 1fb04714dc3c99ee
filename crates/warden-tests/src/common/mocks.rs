// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Collaborators for driving the session controller in isolation.
//!
//! - Scripted responses, with a fallback once the script runs out
//! - Call counters for verification
//! - Latency and failure injection

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use warden_session::{
    AuthService, AuthServiceError, Credentials, PersistenceError, TokenGrant, TokenPersistence,
};

use crate::common::fixtures::TokenFixtures;

type Scripted = Result<TokenGrant, AuthServiceError>;

// =============================================================================
// Mock Auth Service
// =============================================================================

/// A configurable identity-provider stand-in.
///
/// Scripted responses are consumed in order. Once a script is empty, logins
/// and refreshes succeed with a fresh token carrying `fallback_role`.
#[derive(Debug)]
pub struct MockAuthService {
    logins: Mutex<VecDeque<Scripted>>,
    refreshes: Mutex<VecDeque<Scripted>>,
    fallback_role: String,
    latency: Mutex<Duration>,
    fail_all_refreshes: AtomicBool,
    fail_logout: AtomicBool,
    login_count: AtomicU64,
    refresh_count: AtomicU64,
    logout_count: AtomicU64,
    seen_usernames: Mutex<Vec<String>>,
}

impl MockAuthService {
    /// Creates a mock whose unscripted exchanges grant the `user` role.
    pub fn new() -> Self {
        Self {
            logins: Mutex::new(VecDeque::new()),
            refreshes: Mutex::new(VecDeque::new()),
            fallback_role: "user".to_string(),
            latency: Mutex::new(Duration::ZERO),
            fail_all_refreshes: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            login_count: AtomicU64::new(0),
            refresh_count: AtomicU64::new(0),
            logout_count: AtomicU64::new(0),
            seen_usernames: Mutex::new(Vec::new()),
        }
    }

    /// Role granted by unscripted exchanges.
    pub fn with_fallback_role(mut self, role: impl Into<String>) -> Self {
        self.fallback_role = role.into();
        self
    }

    /// Delay applied to every exchange.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    /// Queues a login response.
    pub fn script_login(&self, response: Scripted) {
        self.logins.lock().push_back(response);
    }

    /// Queues a refresh response.
    pub fn script_refresh(&self, response: Scripted) {
        self.refreshes.lock().push_back(response);
    }

    /// Makes every refresh fail with `RefreshRejected`.
    pub fn set_fail_all_refreshes(&self, fail: bool) {
        self.fail_all_refreshes.store(fail, Ordering::SeqCst);
    }

    /// Makes logout fail with `Unavailable`.
    pub fn set_fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// Number of login calls.
    pub fn login_count(&self) -> u64 {
        self.login_count.load(Ordering::SeqCst)
    }

    /// Number of refresh calls.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count.load(Ordering::SeqCst)
    }

    /// Number of logout calls.
    pub fn logout_count(&self) -> u64 {
        self.logout_count.load(Ordering::SeqCst)
    }

    /// Usernames seen by `login`, in call order.
    pub fn seen_usernames(&self) -> Vec<String> {
        self.seen_usernames.lock().clone()
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn fresh_grant(&self) -> TokenGrant {
        TokenGrant::new(TokenFixtures::with_role(&self.fallback_role, 3600))
    }
}

impl Default for MockAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(&self, credentials: &Credentials) -> Result<TokenGrant, AuthServiceError> {
        self.login_count.fetch_add(1, Ordering::SeqCst);
        self.seen_usernames.lock().push(credentials.username.clone());
        self.simulate_latency().await;

        let next = self.logins.lock().pop_front();
        next.unwrap_or_else(|| Ok(self.fresh_grant()))
    }

    async fn refresh(&self) -> Result<TokenGrant, AuthServiceError> {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_all_refreshes.load(Ordering::SeqCst) {
            return Err(AuthServiceError::refresh_rejected("refresh disabled"));
        }

        let next = self.refreshes.lock().pop_front();
        next.unwrap_or_else(|| Ok(self.fresh_grant()))
    }

    async fn logout(&self) -> Result<(), AuthServiceError> {
        self.logout_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(AuthServiceError::unavailable("provider offline"));
        }
        Ok(())
    }
}

// =============================================================================
// Failing Persistence
// =============================================================================

/// Token persistence with per-operation failure switches.
///
/// Succeeding operations behave like an in-memory store.
#[derive(Debug, Default)]
pub struct FailingPersistence {
    token: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_clears: AtomicBool,
    write_attempts: AtomicU64,
    clear_attempts: AtomicU64,
}

impl FailingPersistence {
    /// A store where every operation fails.
    pub fn always() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store.fail_writes.store(true, Ordering::SeqCst);
        store.fail_clears.store(true, Ordering::SeqCst);
        store
    }

    /// A working store holding `token`, with failures switched on later.
    pub fn holding(token: impl Into<String>) -> Self {
        let store = Self::default();
        *store.token.lock() = Some(token.into());
        store
    }

    /// Toggles write failures.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Toggles clear failures.
    pub fn set_fail_clears(&self, fail: bool) {
        self.fail_clears.store(fail, Ordering::SeqCst);
    }

    /// The token currently held, bypassing failure injection.
    pub fn peek(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// Number of `set_token` calls.
    pub fn write_attempts(&self) -> u64 {
        self.write_attempts.load(Ordering::SeqCst)
    }

    /// Number of `clear_token` calls.
    pub fn clear_attempts(&self) -> u64 {
        self.clear_attempts.load(Ordering::SeqCst)
    }
}

impl TokenPersistence for FailingPersistence {
    fn get_token(&self) -> Result<Option<String>, PersistenceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PersistenceError::backend("read failed"));
        }
        Ok(self.token.lock().clone())
    }

    fn set_token(&self, token: &str) -> Result<(), PersistenceError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::backend("write failed"));
        }
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), PersistenceError> {
        self.clear_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_clears.load(Ordering::SeqCst) {
            return Err(PersistenceError::backend("clear failed"));
        }
        *self.token.lock() = None;
        Ok(())
    }
}
