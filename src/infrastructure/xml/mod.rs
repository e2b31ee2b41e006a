//! XML codec: `quick-xml` events in, indented text out.

pub mod reader;
pub mod writer;

use thiserror::Error;

pub use reader::{parse_bytes, parse_str};
pub use writer::{render, AttributeWrap, WriterOptions, DEFAULT_DECLARATION};

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("cannot serialize document: {0}")]
    Serialization(String),
}

impl XmlError {
    pub fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }
}

pub type XmlResult<T> = Result<T, XmlError>;
