#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("request to {0} failed: {1}")]
    Request(String, String),
    #[error("peer returned malformed response: {0}")]
    Malformed(String),
    #[error("peer reported an error: {0}")]
    Remote(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        NetworkError::Request(url, e.to_string())
    }
}
