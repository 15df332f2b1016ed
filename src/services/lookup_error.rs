use reqwest::StatusCode;

/// Ways a single lookup can come back without usable data. Adapters catch
/// these at their boundary and substitute sentinel or empty records.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request to {url} failed after {attempts} attempts (last status: {status:?})")]
    Network {
        url: String,
        attempts: u32,
        status: Option<StatusCode>,
    },
    #[error("response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contained no usable entries")]
    EmptyResult,
    #[error("expected page structure is missing: {0}")]
    ParseMiss(&'static str),
}
