//! pmboard-core - Core library for pmboard
//!
//! Provides the session predicate and route gate, the generic list
//! controller, chart bucketing, client-side validation and, with the
//! `native` feature, the REST client, query cache and configuration.

pub mod access;
pub mod analytics;
pub mod error;
pub mod list;
pub mod notice;
pub mod session_store;
pub mod validation;

#[cfg(feature = "native")]
pub mod cache;
#[cfg(feature = "native")]
pub mod client;
#[cfg(feature = "native")]
pub mod config;

pub use access::{GateDecision, PublicDecision, RouteDef, Screen, authorize, public_gate, resolve, route_for};
pub use error::CoreError;
pub use list::{FetchParams, ListController, ListQuery, ListSpec, ListView, PaginationMode};
pub use notice::{LogNotifier, Notice, NoticeLevel, Notifier};
pub use session_store::{MemorySessionStore, SessionStore};
pub use validation::FieldError;

#[cfg(feature = "native")]
pub use cache::QueryCache;
#[cfg(feature = "native")]
pub use client::{ApiClient, DashboardData};
#[cfg(feature = "native")]
pub use config::PmboardConfig;
#[cfg(feature = "native")]
pub use session_store::FileSessionStore;

pub use pmboard_types as types;
