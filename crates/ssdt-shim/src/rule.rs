use core::fmt;

use ssdt_namespace::{NamespacePath, Value};

use crate::config::{NegotiationConfig, ProxyConfig, Teardown};

/// Proxy entry points that forward to a real device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    Init,
    PowerOn,
    PowerOff,
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleHook::Init => "init",
            LifecycleHook::PowerOn => "power-on",
            LifecycleHook::PowerOff => "power-off",
        })
    }
}

/// A fixed-argument call sent to a query entry point on the target, result
/// discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityCall {
    pub target: NamespacePath,
    pub guid: [u8; 16],
    pub revision: u64,
    pub function: u64,
    pub payload: Vec<u8>,
}

impl CapabilityCall {
    pub fn new(target: NamespacePath, config: &NegotiationConfig) -> Self {
        Self {
            target,
            guid: config.guid,
            revision: config.revision,
            function: config.function,
            payload: config.payload.clone(),
        }
    }

    pub fn args(&self) -> [Value; 4] {
        [
            Value::Buffer(self.guid.to_vec()),
            Value::Integer(self.revision),
            Value::Integer(self.function),
            Value::Buffer(self.payload.clone()),
        ]
    }
}

/// Forwards one proxy entry point to a candidate target method.
///
/// Neither the target nor the optional pre-action is assumed to exist; each
/// is looked up when the rule runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardingRule {
    pub hook: LifecycleHook,
    pub target: NamespacePath,
    pub pre_action: Option<CapabilityCall>,
}

impl ForwardingRule {
    pub fn new(hook: LifecycleHook, target: NamespacePath) -> Self {
        Self {
            hook,
            target,
            pre_action: None,
        }
    }

    pub fn with_pre_action(mut self, call: CapabilityCall) -> Self {
        self.pre_action = Some(call);
        self
    }

    /// The enable/disable rules a proxy configured by `config` installs for
    /// the device at `target`.
    pub fn for_proxy(config: &ProxyConfig, target: &NamespacePath) -> Vec<Self> {
        let enable = Self::new(LifecycleHook::PowerOn, target.join(config.enable_method));
        let mut disable = Self::new(LifecycleHook::PowerOff, target.join(config.disable_method));
        if let Teardown::Negotiated(negotiation) = &config.teardown {
            disable = disable.with_pre_action(CapabilityCall::new(
                target.join(negotiation.method),
                negotiation,
            ));
        }
        vec![enable, disable]
    }
}
