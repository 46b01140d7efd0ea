mod file_service;

pub use file_service::{Clock, FileService};
