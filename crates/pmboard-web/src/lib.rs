//! pmboard-web - Leptos single-page dashboard, plus the Axum static server
//! (`ssr` feature) the CLI uses to host it

#![recursion_limit = "1024"]

pub mod api;
pub mod app;
pub mod components;
pub mod list;
pub mod pages;
pub mod session;
pub mod utils;

#[cfg(feature = "ssr")]
pub mod server;

pub use app::App;

#[cfg(feature = "ssr")]
pub use server::{create_router, run};
