//! pmboard-types - Shared data types for pmboard
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable types.
//!
//! Used by:
//! - pmboard-core (gate, list controller, REST client)
//! - pmboard-web (frontend WASM)
//! - pmboard (CLI)

pub mod envelope;
pub mod models;
pub mod role;
pub mod session;

pub use envelope::{ApiMessage, Detail, ListResponse, PaginationMeta};
pub use models::{
    Assignment, Attachment, Comment, Credentials, NewAssignment, NewComment, NewPhase,
    NewProject, NewTeamUpdate, NewTicket, Notification, Project, ProjectPatch, ProjectPhase,
    SignInResponse, TeamUpdate, Ticket, TicketPatch, TicketType, UpdateKind, User,
};
pub use role::{ParseRoleError, Role};
pub use session::Session;
