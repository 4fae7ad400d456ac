use ssdt_namespace::{NamespacePath, PathError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no ACPI paths given")]
    NoPaths,

    #[error("cannot name a proxy device for each of {0} paths (at most 999)")]
    TooManyPaths(usize),

    #[error("unknown disable method {0:?} (expected s3, off or ioname)")]
    UnknownMethod(String),

    #[error("device id {0:?} must be exactly four hex digits (e.g. 67DF)")]
    InvalidDeviceId(String),

    #[error("the generic GPU spoof needs a display model name")]
    MissingModel,

    #[error("model name {0:?} cannot be embedded in an ASL string")]
    InvalidModel(String),

    #[error("path {0} has no PEGP segment")]
    NoPegp(NamespacePath),

    #[error("path {0} is not absolute")]
    RelativePath(NamespacePath),

    #[error("template has no {{ADDR}} placeholder")]
    MissingPlaceholder,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationPathError {
    #[error("empty location path")]
    Empty,

    #[error("unrecognised location path component {0:?}")]
    UnknownComponent(String),

    #[error("malformed {kind} component {component:?}")]
    Malformed {
        kind: &'static str,
        component: String,
    },

    #[error("PCI device 0x{device:X} function 0x{function:X} is out of range")]
    OutOfRange { device: u32, function: u32 },

    #[error("a PCI location path must start with its root bridge")]
    MissingRoot,

    #[error(transparent)]
    Name(#[from] PathError),
}
