use std::collections::BTreeSet;
use std::sync::Arc;

/// The host's platform identity probe (the `_OSI` analogue).
///
/// Treated as an opaque oracle: implementations answer whether the running
/// operating system claims the given interface name.
pub trait HostOracle {
    fn query_platform_identity(&self, name: &str) -> bool;
}

impl<T: HostOracle + ?Sized> HostOracle for &T {
    fn query_platform_identity(&self, name: &str) -> bool {
        (**self).query_platform_identity(name)
    }
}

impl<T: HostOracle + ?Sized> HostOracle for Box<T> {
    fn query_platform_identity(&self, name: &str) -> bool {
        (**self).query_platform_identity(name)
    }
}

impl<T: HostOracle + ?Sized> HostOracle for Arc<T> {
    fn query_platform_identity(&self, name: &str) -> bool {
        (**self).query_platform_identity(name)
    }
}

/// A host that answers `true` for a fixed set of interface names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticHost {
    interfaces: BTreeSet<String>,
}

impl StaticHost {
    pub fn new<I, S>(interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interfaces: interfaces.into_iter().map(Into::into).collect(),
        }
    }

    /// A host that identifies as macOS.
    pub fn darwin() -> Self {
        Self::new(["Darwin"])
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(String::as_str)
    }
}

impl HostOracle for StaticHost {
    fn query_platform_identity(&self, name: &str) -> bool {
        self.interfaces.contains(name)
    }
}
