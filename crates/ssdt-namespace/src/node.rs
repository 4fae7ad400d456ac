use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::InvokeError;
use crate::host::HostOracle;
use crate::name::NameSeg;
use crate::resolver::Resolver;
use crate::value::Value;

/// Everything a running control method can see: the namespace it was
/// resolved from, the host's identity probe, and its arguments.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    pub resolver: &'a dyn Resolver,
    pub host: &'a dyn HostOracle,
    pub args: &'a [Value],
}

impl<'a> Invocation<'a> {
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }
}

pub type MethodFn = dyn Fn(&Invocation<'_>) -> Value + Send + Sync;

#[derive(Clone)]
pub enum MethodBody {
    /// Forward reference: some other fragment promises to define it.
    External,
    Defined(Arc<MethodFn>),
}

/// A callable entry point bound to a device node.
#[derive(Clone)]
pub struct MethodSlot {
    tag: NameSeg,
    arity: u8,
    body: MethodBody,
}

impl MethodSlot {
    pub fn external(tag: NameSeg, arity: u8) -> Self {
        Self {
            tag,
            arity,
            body: MethodBody::External,
        }
    }

    pub fn defined<F>(tag: NameSeg, arity: u8, body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Value + Send + Sync + 'static,
    {
        Self {
            tag,
            arity,
            body: MethodBody::Defined(Arc::new(body)),
        }
    }

    pub fn tag(&self) -> NameSeg {
        self.tag
    }

    pub fn arity(&self) -> u8 {
        self.arity
    }

    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    pub fn is_external(&self) -> bool {
        matches!(self.body, MethodBody::External)
    }

    pub fn invoke(
        &self,
        resolver: &dyn Resolver,
        host: &dyn HostOracle,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        let body = match &self.body {
            MethodBody::External => return Err(InvokeError::External { tag: self.tag }),
            MethodBody::Defined(body) => body,
        };
        if args.len() != usize::from(self.arity) {
            return Err(InvokeError::ArgCount {
                tag: self.tag,
                expected: self.arity,
                found: args.len(),
            });
        }
        Ok(body(&Invocation {
            resolver,
            host,
            args,
        }))
    }
}

impl fmt::Debug for MethodSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSlot")
            .field("tag", &self.tag)
            .field("arity", &self.arity)
            .field("external", &self.is_external())
            .finish()
    }
}

/// A named entity in the device tree.
///
/// Methods, static properties and child devices share one name space per
/// node: a tag may appear in at most one of the three maps.
#[derive(Clone, Debug)]
pub struct DeviceNode {
    name: NameSeg,
    methods: BTreeMap<NameSeg, MethodSlot>,
    properties: BTreeMap<NameSeg, Value>,
    children: BTreeMap<NameSeg, DeviceNode>,
}

impl DeviceNode {
    pub fn new(name: NameSeg) -> Self {
        Self {
            name,
            methods: BTreeMap::new(),
            properties: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn with_method(mut self, slot: MethodSlot) -> Self {
        self.methods.insert(slot.tag(), slot);
        self
    }

    pub fn with_property(mut self, tag: NameSeg, value: impl Into<Value>) -> Self {
        self.properties.insert(tag, value.into());
        self
    }

    pub fn with_child(mut self, child: DeviceNode) -> Self {
        self.children.insert(child.name, child);
        self
    }

    pub fn name(&self) -> NameSeg {
        self.name
    }

    pub fn contains(&self, tag: NameSeg) -> bool {
        self.methods.contains_key(&tag)
            || self.properties.contains_key(&tag)
            || self.children.contains_key(&tag)
    }

    pub fn method(&self, tag: NameSeg) -> Option<&MethodSlot> {
        self.methods.get(&tag)
    }

    pub fn property(&self, tag: NameSeg) -> Option<&Value> {
        self.properties.get(&tag)
    }

    pub fn child(&self, tag: NameSeg) -> Option<&DeviceNode> {
        self.children.get(&tag)
    }

    pub fn child_mut(&mut self, tag: NameSeg) -> Option<&mut DeviceNode> {
        self.children.get_mut(&tag)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodSlot> {
        self.methods.values()
    }

    pub fn properties(&self) -> impl Iterator<Item = (NameSeg, &Value)> {
        self.properties.iter().map(|(k, v)| (*k, v))
    }

    pub fn children(&self) -> impl Iterator<Item = &DeviceNode> {
        self.children.values()
    }

    pub(crate) fn methods_mut(&mut self) -> &mut BTreeMap<NameSeg, MethodSlot> {
        &mut self.methods
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeMap<NameSeg, DeviceNode> {
        &mut self.children
    }
}
