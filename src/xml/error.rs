use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Document is empty")]
    Empty,

    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Document has more than one root element (second one at byte {0})")]
    MultipleRoots(u64),

    #[error("Unexpected content outside the root element at byte {0}")]
    ContentOutsideRoot(u64),

    #[error("Element <{0}> is never closed")]
    Unclosed(String),

    #[error("Undeclared entity reference &{0};")]
    UndeclaredEntity(String),

    #[error("Entity &{0}; is external or contains markup, which is not supported")]
    UnsupportedEntity(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl ParseError {
    pub(crate) fn malformed(position: u64, err: impl Display) -> Self {
        ParseError::Malformed {
            position,
            message: err.to_string(),
        }
    }
}
