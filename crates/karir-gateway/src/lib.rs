//! Karir Gateway - the caching fetch service in front of APIJobs

pub mod server;

pub use server::{router, start_fetch_service, FetchState};
