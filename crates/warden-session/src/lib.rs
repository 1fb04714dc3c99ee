// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-session
//!
//! Session lifecycle for the operator dashboard.
//!
//! - **SessionStore**: observable holder of the current session
//! - **SessionController**: login, coalesced refresh, logout
//! - **Collaborators**: the auth-service and token-persistence boundaries
//! - **Persistence**: in-memory and file-backed token stores
//! - **Timer**: cancellable periodic tasks
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warden_session::{Credentials, FileTokenStore, SessionController};
//!
//! let controller = SessionController::builder(auth, Arc::new(FileTokenStore::new(path)))
//!     .resolver(resolver)
//!     .build();
//!
//! controller.store().subscribe_fn(|session| {
//!     tracing::info!(roles = %session.roles, "Session changed");
//! });
//!
//! controller.login(&Credentials::new("ops", "secret")).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod collaborator;
pub mod controller;
pub mod error;
pub mod persistence;
pub mod store;
pub mod timer;

pub use collaborator::{AuthService, Credentials, TokenGrant, TokenPersistence};
pub use controller::{SessionController, SessionControllerBuilder, SessionState};
pub use error::{AuthServiceError, PersistenceError, SessionError, SessionResult, StoreError};
pub use persistence::{FileTokenStore, MemoryTokenStore, TOKEN_KEY};
pub use store::{ListenerId, SessionListener, SessionStore};
pub use timer::{PeriodicTask, DEFAULT_DATA_REFRESH_INTERVAL, MIN_PERIOD};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
