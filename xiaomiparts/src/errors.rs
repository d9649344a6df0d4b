// Copyright 2024 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::num::ParseIntError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    #[error("Property error: {0}")]
    Property(rsproperties::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Unknown control: {0}")]
    UnknownControl(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    pub fn new_service_unavailable(msg: String) -> Error {
        Error::ServiceUnavailable(msg)
    }

    pub fn new_unknown_control(key: String) -> Error {
        Error::UnknownControl(key)
    }

    pub fn new_parse(msg: String) -> Error {
        Error::Parse(msg)
    }

    pub fn new_io(io_error: std::io::Error) -> Error {
        let error = Error::Io(io_error);
        log::error!("I/O error: {}", error);
        error
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        let error = Error::Io(source);
        log::error!("Converting I/O error to Error: {}", error);
        error
    }
}

impl From<rsproperties::Error> for Error {
    fn from(source: rsproperties::Error) -> Self {
        log::error!("Property service failure: {}", source);
        Error::Property(source)
    }
}

impl From<ParseIntError> for Error {
    fn from(source: ParseIntError) -> Self {
        Error::Parse(format!("Parse integer error: {}", source))
    }
}
