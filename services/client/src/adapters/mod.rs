pub mod auth;
pub mod catalogue;
pub mod content;
pub mod fallback;
pub mod http;
pub mod mirror;
pub mod test_results;
pub mod wire;

pub use auth::HttpAuthAdapter;
pub use content::HttpContentAdapter;
pub use fallback::{CatalogueContentService, MirroredTestService};
pub use http::{Dispatched, HttpDispatcher, RequestOptions, Service};
pub use mirror::{FileMirror, MemoryMirror};
pub use test_results::HttpTestAdapter;
