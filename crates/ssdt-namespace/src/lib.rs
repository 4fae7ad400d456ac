#![forbid(unsafe_code)]

//! In-process model of an ACPI-style device namespace.
//!
//! The real namespace belongs to the firmware-table interpreter of the host.
//! This crate captures the contract patch fragments rely on: path syntax,
//! device nodes carrying method slots and static properties, forward
//! (`External`) references, side-effect-free resolution, and a host identity
//! probe that control methods may consult.

mod block;
mod error;
mod host;
mod name;
mod namespace;
mod node;
mod resolver;
mod value;

pub use crate::block::{DefinitionBlock, External, LoadSummary, ObjectType, ScopeBlock};
pub use crate::error::{InvokeError, NamespaceError, PathError, Result, UuidError};
pub use crate::host::{HostOracle, StaticHost};
pub use crate::name::{NameSeg, NamespacePath};
pub use crate::namespace::Namespace;
pub use crate::node::{DeviceNode, Invocation, MethodBody, MethodFn, MethodSlot};
pub use crate::resolver::Resolver;
pub use crate::value::{to_uuid, Value};

/// Well-known object names.
pub mod names {
    use crate::NameSeg;

    pub const ADR: NameSeg = NameSeg::from_static(b"_ADR");
    pub const DSM: NameSeg = NameSeg::from_static(b"_DSM");
    pub const HID: NameSeg = NameSeg::from_static(b"_HID");
    pub const INI: NameSeg = NameSeg::from_static(b"_INI");
    pub const OFF: NameSeg = NameSeg::from_static(b"_OFF");
    pub const ON: NameSeg = NameSeg::from_static(b"_ON_");
    pub const PS0: NameSeg = NameSeg::from_static(b"_PS0");
    pub const PS3: NameSeg = NameSeg::from_static(b"_PS3");
    pub const STA: NameSeg = NameSeg::from_static(b"_STA");
    pub const SB: NameSeg = NameSeg::from_static(b"_SB_");
}
