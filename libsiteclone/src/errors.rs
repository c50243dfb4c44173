use std::fmt::Formatter;

#[derive(Debug, PartialEq)]
pub enum SiteCloneError {
    ErrorCreatingDestinationDirectory(String),
    InvalidUrl(String),
    /// Chromium could not be found, configured or launched.
    BrowserUnavailable(String),
    NavigationError {
        url: String,
        message: String,
    },
    /// Reading the rendered document out of the page failed.
    PageContentError(String),
    /// parameters are file path, additional error message
    FileOperationError {
        file_name: String,
        message: String,
    },
    NetworkError(String),
    ErrorStatusCode {
        status_code: String,
        url: String,
    },
    InvalidToolInput {
        tool: String,
        message: String,
    },
    UnknownError(String),
}

impl std::fmt::Display for SiteCloneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            SiteCloneError::ErrorCreatingDestinationDirectory(err) => {
                format!("error creating destination directory. {err}")
            }
            SiteCloneError::InvalidUrl(url) => format!("Invalid url received : {url}"),
            SiteCloneError::BrowserUnavailable(err) => {
                format!("headless browser unavailable. {err}")
            }
            SiteCloneError::NavigationError { url, message } => {
                format!("navigation to {url} failed. {message}")
            }
            SiteCloneError::PageContentError(err) => {
                format!("error reading rendered page content. {err}")
            }
            SiteCloneError::FileOperationError { file_name, message } => {
                format!("{message} : {file_name}")
            }
            SiteCloneError::NetworkError(err) => format!("error connecting to internet. {err}"),
            SiteCloneError::ErrorStatusCode { status_code, url } => {
                format!("server returned an error response. {url} => {status_code}")
            }
            SiteCloneError::InvalidToolInput { tool, message } => {
                format!("invalid input for tool {tool}. {message}")
            }
            SiteCloneError::UnknownError(err) => format!("an unknown error occurred. {err}"),
        };
        write!(f, "{str}")
    }
}

impl std::error::Error for SiteCloneError {}

impl From<chromiumoxide::error::CdpError> for SiteCloneError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        SiteCloneError::BrowserUnavailable(e.to_string())
    }
}
