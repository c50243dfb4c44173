use std::fmt::Formatter;

#[derive(Debug)]
pub enum Error {
    /// A required setting is missing from the environment.
    Config(String),
    ModelRequest(String),
    /// The model answered with something that isn't a step object.
    InvalidStep(String),
    Console(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::Config(reason) => format!("Configuration error : {reason}"),
            Self::ModelRequest(reason) => format!("Model request failed : {reason}"),
            Self::InvalidStep(reason) => format!("Invalid step from model : {reason}"),
            Self::Console(reason) => format!("Console error : {reason}"),
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
