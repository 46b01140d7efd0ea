mod file_repository;
#[cfg(test)]
mod memory;

pub use file_repository::{FileRepository, PgFileRepository};
#[cfg(test)]
pub use memory::MemoryFileRepository;
