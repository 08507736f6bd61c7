use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("invalid size synonym \"{synonym}\": {source}")]
    InvalidSizePattern {
        synonym: String,
        #[source]
        source: regex::Error,
    },
}
