// Input resolution
//
// - media.rs: MediaFile, origins and supported extensions
// - download.rs: MediaFetcher trait and the HTTP fetcher with its download cache
// - resolver.rs: InputResolver for files, directories, URLs and .list manifests

pub mod media;
pub mod download;
pub mod resolver;

pub use media::{is_manifest, is_supported, is_url, MediaFile, MediaOrigin, MANIFEST_EXTENSION, SUPPORTED_EXTENSIONS};
pub use download::{HttpFetcher, MediaFetcher};
pub use resolver::{InputResolver, Resolution};
