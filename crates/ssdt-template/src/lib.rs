#![forbid(unsafe_code)]

//! ASL patch templates for discrete GPUs and the path conversions needed to
//! fill them in.

mod catalog;
mod device_id;
mod error;
mod location;
mod render;

pub use crate::catalog::{DisableMethod, TemplateKind};
pub use crate::device_id::DeviceId;
pub use crate::error::{LocationPathError, TemplateError};
pub use crate::location::{
    acpi_location_to_namespace, convert, Converted, PciHop, PciLocation,
};
pub use crate::render::{
    asl_path, pegp_parent, render_disable, render_spoof, substitute_addr, Rendered, SpoofKind,
    SpoofRequest, ADDR_PLACEHOLDER,
};
