pub mod exporter;
pub mod fetcher;
pub mod lookup_error;
pub mod pipeline;
pub mod place_search;
pub mod registry_scraper;
pub mod similarity;

pub use exporter::*;
pub use fetcher::*;
pub use lookup_error::*;
pub use pipeline::*;
pub use place_search::*;
pub use registry_scraper::*;
pub use similarity::*;
