#[cfg(test)]
use crate::core::router::app_router;
#[cfg(test)]
use crate::features::files::repositories::MemoryFileRepository;
#[cfg(test)]
use crate::features::files::services::{Clock, FileService};
#[cfg(test)]
use crate::features::pages::PageService;
#[cfg(test)]
use crate::modules::storage::MemoryObjectStore;
#[cfg(test)]
use axum_test::TestServer;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
pub const TEST_PUBLIC_BASE: &str = "http://storage.test/uploads";

#[cfg(test)]
pub const TEST_MAX_UPLOAD_SIZE: usize = 1024 * 1024;

/// Router wired to in-memory storage, with handles to inspect both stores
#[cfg(test)]
pub struct TestApp {
    pub server: TestServer,
    pub repository: Arc<MemoryFileRepository>,
    pub store: Arc<MemoryObjectStore>,
}

#[cfg(test)]
pub fn test_app() -> TestApp {
    test_app_with(MemoryObjectStore::new(TEST_PUBLIC_BASE), None)
}

#[cfg(test)]
pub fn test_app_with(store: MemoryObjectStore, clock: Option<Clock>) -> TestApp {
    let repository = Arc::new(MemoryFileRepository::new());
    let store = Arc::new(store);

    let file_service = Arc::new(match clock {
        Some(clock) => FileService::with_clock(repository.clone(), store.clone(), clock),
        None => FileService::new(repository.clone(), store.clone()),
    });
    let page_service = Arc::new(
        PageService::new(Arc::clone(&file_service), TEST_MAX_UPLOAD_SIZE)
            .expect("page templates compile"),
    );

    let server = TestServer::new(app_router(file_service, page_service, TEST_MAX_UPLOAD_SIZE))
        .expect("test server starts");

    TestApp {
        server,
        repository,
        store,
    }
}
