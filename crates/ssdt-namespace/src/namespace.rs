use std::sync::Arc;

use crate::block::{DefinitionBlock, LoadSummary};
use crate::error::{NamespaceError, Result};
use crate::host::{HostOracle, StaticHost};
use crate::name::{NameSeg, NamespacePath};
use crate::node::{DeviceNode, MethodSlot};
use crate::resolver::Resolver;
use crate::value::Value;

const ROOT_NAME: NameSeg = NameSeg::from_static(b"____");

/// The host-owned device tree, plus the identity probe methods see when the
/// tree evaluates them.
#[derive(Clone)]
pub struct Namespace {
    root: DeviceNode,
    host: Arc<dyn HostOracle + Send + Sync>,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Namespace")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn node_at<'a>(root: &'a DeviceNode, path: &NamespacePath) -> Option<&'a DeviceNode> {
    path.segments()
        .iter()
        .try_fold(root, |node, seg| node.child(*seg))
}

fn node_at_mut<'a>(root: &'a mut DeviceNode, path: &NamespacePath) -> Option<&'a mut DeviceNode> {
    let mut node = root;
    for seg in path.segments() {
        node = node.child_mut(*seg)?;
    }
    Some(node)
}

fn absolute(path: &NamespacePath) -> Result<NamespacePath> {
    path.anchored_at(&NamespacePath::root())
        .ok_or_else(|| NamespaceError::AboveRoot(path.clone()))
}

impl Namespace {
    /// An empty tree whose host answers `false` to every identity probe.
    pub fn new() -> Self {
        Self::with_host(StaticHost::default())
    }

    pub fn with_host(host: impl HostOracle + Send + Sync + 'static) -> Self {
        Self {
            root: DeviceNode::new(ROOT_NAME),
            host: Arc::new(host),
        }
    }

    pub fn set_host(&mut self, host: impl HostOracle + Send + Sync + 'static) {
        self.host = Arc::new(host);
    }

    pub fn host(&self) -> &dyn HostOracle {
        &*self.host
    }

    pub fn root(&self) -> &DeviceNode {
        &self.root
    }

    /// The device or scope at `path` (relative paths are taken from the root).
    pub fn node(&self, path: &NamespacePath) -> Option<&DeviceNode> {
        let path = path.anchored_at(&NamespacePath::root())?;
        node_at(&self.root, &path)
    }

    /// The method slot at `path`, including forward references.
    pub fn method(&self, path: &NamespacePath) -> Option<&MethodSlot> {
        let path = path.anchored_at(&NamespacePath::root())?;
        let tag = path.name()?;
        self.node(&path.parent()?)?.method(tag)
    }

    pub fn property(&self, path: &NamespacePath) -> Option<&Value> {
        let path = path.anchored_at(&NamespacePath::root())?;
        let tag = path.name()?;
        self.node(&path.parent()?)?.property(tag)
    }

    /// True if any object (device, method, external or property) lives at `path`.
    pub fn contains(&self, path: &NamespacePath) -> bool {
        let Some(path) = path.anchored_at(&NamespacePath::root()) else {
            return false;
        };
        match (path.parent(), path.name()) {
            (Some(parent), Some(tag)) => self.node(&parent).is_some_and(|n| n.contains(tag)),
            _ => path.is_root(),
        }
    }

    pub fn add_device(&mut self, scope: &NamespacePath, device: DeviceNode) -> Result<()> {
        insert_device(&mut self.root, &absolute(scope)?, device)
    }

    /// Adds a method under `scope`. A forward reference with the same tag is
    /// replaced by the definition.
    pub fn add_method(&mut self, scope: &NamespacePath, slot: MethodSlot) -> Result<()> {
        insert_method(&mut self.root, &absolute(scope)?, slot)
    }

    /// Evaluates the object at `path` as the host would: methods are invoked
    /// with `args`; static properties evaluate to their value.
    pub fn evaluate(&self, path: &NamespacePath, args: &[Value]) -> Result<Value> {
        let abs = absolute(path)?;
        if let Some(slot) = self.method(&abs) {
            return slot
                .invoke(self, self.host(), args)
                .map_err(|source| NamespaceError::Invoke { path: abs, source });
        }
        if args.is_empty() {
            if let Some(value) = self.property(&abs) {
                return Ok(value.clone());
            }
        }
        Err(NamespaceError::NotFound(abs))
    }

    /// Loads a patch fragment. The block is applied to a staged copy of the
    /// tree; on error the namespace is left untouched.
    pub fn load(&mut self, block: DefinitionBlock) -> Result<LoadSummary> {
        let mut staged = self.root.clone();
        let mut summary = LoadSummary::default();

        for external in &block.externals {
            let path = absolute(&external.path)?;
            let (Some(parent), Some(tag)) = (path.parent(), path.name()) else {
                continue;
            };
            if node_at(&staged, &parent).is_some_and(|node| node.contains(tag)) {
                continue;
            }
            tracing::debug!(table = %block.table_id, %path, kind = ?external.kind, "external object is absent");
            summary.unresolved_externals.push(path);
        }

        for scope in block.scopes {
            let path = absolute(&scope.path)?;
            for device in scope.devices {
                insert_device(&mut staged, &path, device)?;
                summary.devices_added += 1;
            }
            for slot in scope.methods {
                insert_method(&mut staged, &path, slot)?;
                summary.methods_added += 1;
            }
        }

        self.root = staged;
        tracing::debug!(
            table = %block.table_id,
            devices = summary.devices_added,
            methods = summary.methods_added,
            unresolved = summary.unresolved_externals.len(),
            "loaded definition block"
        );
        Ok(summary)
    }
}

impl Resolver for Namespace {
    fn resolve(&self, path: &NamespacePath) -> Option<MethodSlot> {
        self.method(path)
            .filter(|slot| !slot.is_external())
            .cloned()
    }
}

fn scope_mut<'a>(root: &'a mut DeviceNode, scope: &NamespacePath) -> Result<&'a mut DeviceNode> {
    node_at_mut(root, scope).ok_or_else(|| NamespaceError::ScopeNotFound(scope.clone()))
}

fn insert_device(root: &mut DeviceNode, scope: &NamespacePath, device: DeviceNode) -> Result<()> {
    let node = scope_mut(root, scope)?;
    let tag = device.name();
    if node.contains(tag) {
        return Err(NamespaceError::AlreadyExists(scope.join(tag)));
    }
    node.children_mut().insert(tag, device);
    Ok(())
}

fn insert_method(root: &mut DeviceNode, scope: &NamespacePath, slot: MethodSlot) -> Result<()> {
    let node = scope_mut(root, scope)?;
    let tag = slot.tag();
    let replaces_external = node.method(tag).is_some_and(MethodSlot::is_external);
    if node.contains(tag) && !replaces_external {
        return Err(NamespaceError::AlreadyExists(scope.join(tag)));
    }
    node.methods_mut().insert(tag, slot);
    Ok(())
}
