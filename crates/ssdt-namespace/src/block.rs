use crate::name::NamespacePath;
use crate::node::{DeviceNode, MethodSlot};

/// Object type carried by an `External` declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectType {
    Device,
    Method { arity: u8 },
}

/// A forward reference to an object the fragment expects some other table to
/// provide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct External {
    pub path: NamespacePath,
    pub kind: ObjectType,
}

/// Objects a fragment adds under an existing scope.
#[derive(Clone, Debug)]
pub struct ScopeBlock {
    pub path: NamespacePath,
    pub devices: Vec<DeviceNode>,
    pub methods: Vec<MethodSlot>,
}

impl ScopeBlock {
    pub fn new(path: NamespacePath) -> Self {
        Self {
            path,
            devices: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn device(mut self, device: DeviceNode) -> Self {
        self.devices.push(device);
        self
    }

    pub fn method(mut self, slot: MethodSlot) -> Self {
        self.methods.push(slot);
        self
    }
}

/// A self-contained patch fragment (the body of an SSDT).
#[derive(Clone, Debug)]
pub struct DefinitionBlock {
    pub table_id: String,
    pub externals: Vec<External>,
    pub scopes: Vec<ScopeBlock>,
}

impl DefinitionBlock {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            externals: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn external(mut self, path: NamespacePath, kind: ObjectType) -> Self {
        self.externals.push(External { path, kind });
        self
    }

    pub fn scope(mut self, scope: ScopeBlock) -> Self {
        self.scopes.push(scope);
        self
    }
}

/// What a successful [`crate::Namespace::load`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub devices_added: usize,
    pub methods_added: usize,
    /// External declarations whose object did not exist when the block was
    /// loaded. References through them stay inert until something defines
    /// the object. Loading never writes placeholders for them into the tree.
    pub unresolved_externals: Vec<NamespacePath>,
}
