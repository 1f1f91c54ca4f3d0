use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Blocking run requested from inside an async runtime.")]
    NestedRuntime,
    #[error("Failed to build async runtime: {source}")]
    BuildRuntimeFailed {
        #[source]
        source: std::io::Error,
    },
}
