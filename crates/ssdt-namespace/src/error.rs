use thiserror::Error;

use crate::name::{NameSeg, NamespacePath};

pub type Result<T> = std::result::Result<T, NamespaceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty namespace path")]
    Empty,

    #[error("empty name segment")]
    EmptySegment,

    #[error("name segment {0:?} is longer than 4 characters")]
    SegmentTooLong(String),

    #[error("invalid character {ch:?} in name segment {segment:?}")]
    InvalidChar { segment: String, ch: char },

    #[error("absolute path {0:?} cannot carry parent prefixes")]
    ParentPrefixOnAbsolute(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("method {tag} is an external reference with no body")]
    External { tag: NameSeg },

    #[error("method {tag} takes {expected} argument(s), got {found}")]
    ArgCount {
        tag: NameSeg,
        expected: u8,
        found: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UuidError {
    #[error("malformed UUID {0:?}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("scope {0} does not exist")]
    ScopeNotFound(NamespacePath),

    #[error("object {0} already exists")]
    AlreadyExists(NamespacePath),

    #[error("object {0} not found")]
    NotFound(NamespacePath),

    #[error("path {0} climbs above the root")]
    AboveRoot(NamespacePath),

    #[error("invoking {path}: {source}")]
    Invoke {
        path: NamespacePath,
        #[source]
        source: InvokeError,
    },

    #[error(transparent)]
    Path(#[from] PathError),
}
