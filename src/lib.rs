#![forbid(unsafe_code)]

//! GPU patch fragments for ACPI namespaces: templates to generate them and an
//! in-process namespace to check what they do once loaded.

pub use ssdt_namespace as namespace;
pub use ssdt_shim as shim;
pub use ssdt_template as template;
