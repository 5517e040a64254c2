//! I/O layer: the HTTP seam, the content cache, the fetch queue and bulk
//! cache checks.

mod cache;
mod check;
mod http;
mod queue;
mod transfer;

pub use cache::{CacheState, ContentCache};
pub use check::{CHECK_CONCURRENCY, CacheCheck};
pub use http::{BoxStream, HttpClient};
pub use queue::{DEFAULT_CONCURRENCY, FetchQueue};
pub use transfer::{InFlight, Transfer, TransferId};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
