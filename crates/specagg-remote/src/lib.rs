pub mod error;
pub mod fetcher;
pub mod github;
pub mod local;
pub mod resolver;
pub mod source;
pub mod specs;

// Re-export commonly used types
pub use error::{RemoteError, RemoteResult};
pub use fetcher::{fetch_document, parse_document};
pub use github::GitHubSource;
pub use local::LocalSource;
pub use resolver::{join_posix, ExternalRef, RefResolver, ResolutionCache, MAX_CONCURRENT_FETCHES};
pub use source::{DirEntry, EntryKind, SpecSource};
pub use specs::{fetch_service_specs, is_spec_file};
