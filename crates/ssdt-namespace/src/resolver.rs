use std::sync::Arc;

use crate::name::NamespacePath;
use crate::node::MethodSlot;

/// Evaluation-time lookup of callable entry points.
///
/// "Maybe absent" is an ordinary answer here: neither operation fails, and a
/// path whose intermediate scopes are missing simply resolves to nothing.
/// Forward references (`External` slots) are not callable and resolve to
/// `None` until a fragment defines them.
pub trait Resolver {
    fn resolve(&self, path: &NamespacePath) -> Option<MethodSlot>;

    fn exists(&self, path: &NamespacePath) -> bool {
        self.resolve(path).is_some()
    }
}

impl<T: Resolver + ?Sized> Resolver for &T {
    fn resolve(&self, path: &NamespacePath) -> Option<MethodSlot> {
        (**self).resolve(path)
    }

    fn exists(&self, path: &NamespacePath) -> bool {
        (**self).exists(path)
    }
}

impl<T: Resolver + ?Sized> Resolver for Box<T> {
    fn resolve(&self, path: &NamespacePath) -> Option<MethodSlot> {
        (**self).resolve(path)
    }

    fn exists(&self, path: &NamespacePath) -> bool {
        (**self).exists(path)
    }
}

impl<T: Resolver + ?Sized> Resolver for Arc<T> {
    fn resolve(&self, path: &NamespacePath) -> Option<MethodSlot> {
        (**self).resolve(path)
    }

    fn exists(&self, path: &NamespacePath) -> bool {
        (**self).exists(path)
    }
}
