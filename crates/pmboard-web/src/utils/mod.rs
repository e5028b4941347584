pub mod download;

pub use download::{export_as_csv, now, save_bytes};
