//! UI components

pub mod chart;
pub mod confirm_dialog;
pub mod error_boundary;
pub mod header;
pub mod list_controls;
pub mod route_gate;
pub mod sidebar;
pub mod stats_card;
pub mod toast;

pub use chart::{BarChart, ProgressList, TrendChart};
pub use confirm_dialog::ConfirmDialog;
pub use error_boundary::{EmptyState, ErrorFallback, FieldMessage};
pub use header::Header;
pub use list_controls::{ColumnToggle, FilterSelect, ListStatus, Pager, SearchBar, SortSelect};
pub use route_gate::{Forbidden, NotFound, ProtectedRoute, PublicRoute, Unauthorized};
pub use sidebar::Sidebar;
pub use stats_card::{CardColor, StatsCard};
pub use toast::{use_toast, ToastContext, ToastProvider};
