//! Webservice client.
//!
//! Collections are paginated. The first page is fetched alone to learn the
//! total and page size; remaining pages are spread over a small pool of
//! workers and merged by the caller.
//!
//! # Submodules
//!
//! - [`requester`] - Per-tenant HTTP client and the paginated fetch pool
//! - [`response`] - Response envelopes

pub mod requester;
pub mod response;

pub use requester::{FetchOutcome, Requester, ACTIVE_PROPERTIES_PATH, PAGE_SIZE, REQUEST_TIMEOUT};
pub use response::{ActiveIds, ActiveIdsResponse, PaginatedResponse};
