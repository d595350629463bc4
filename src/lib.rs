// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod ingest;
pub mod metrics;
pub mod rank;
pub mod sanitize;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::ingest::types::{Article, RawArticle};
pub use crate::rank::{merge, MAX_RANKED_ITEMS};
pub use crate::sanitize::sanitize;
pub use crate::store::{subject_key, MemoryStore, SubjectStore, STORE_TTL};
