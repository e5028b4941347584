//! DTOs mirrored from the backend
//!
//! Field names follow the backend's camelCase JSON. Unknown fields are
//! ignored and optional fields default, so additive backend changes do not
//! break decoding.

pub mod auth;
pub mod project;
pub mod ticket;
pub mod update;
pub mod user;

pub use auth::{Credentials, SignInResponse};
pub use project::{
    Assignment, NewAssignment, NewPhase, NewProject, Project, ProjectPatch, ProjectPhase,
};
pub use ticket::{
    Attachment, Comment, NewComment, NewTicket, Notification, Ticket, TicketPatch, TicketType,
};
pub use update::{NewTeamUpdate, TeamUpdate, UpdateKind};
pub use user::User;
