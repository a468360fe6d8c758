use std::fmt;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("invalid source url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("unsupported scheme {scheme:?} in source url {url:?}")]
    UnsupportedScheme { url: String, scheme: String },
}

/// A listing page to crawl once per run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    url: Url,
}

impl Source {
    pub fn parse(raw: &str) -> Result<Self, SourceError> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|err| SourceError::InvalidUrl {
            url: trimmed.to_string(),
            message: err.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(SourceError::UnsupportedScheme {
                url: trimmed.to_string(),
                scheme: other.to_string(),
            }),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
