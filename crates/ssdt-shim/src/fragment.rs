//! Loadable fragments wiring the shim and responder into a namespace.

use std::sync::Arc;

use ssdt_namespace::{
    names, DefinitionBlock, DeviceNode, HostOracle, MethodSlot, NameSeg, NamespacePath, ObjectType,
    Resolver, ScopeBlock, Value,
};

use crate::config::{ProxyConfig, SpoofConfig, SpoofPlacement, Teardown};
use crate::identity::IdentityResponder;
use crate::shim::{DispatchReport, ProxyLifecycle};

#[derive(Debug)]
pub struct ProxyFragment {
    pub block: DefinitionBlock,
    /// Path of the proxy device once the block is loaded.
    pub device: NamespacePath,
    /// Shared with the proxy's methods; lets callers observe its state.
    pub lifecycle: Arc<ProxyLifecycle>,
}

type EntryPoint = fn(&ProxyLifecycle, &dyn Resolver, &dyn HostOracle) -> DispatchReport;

fn lifecycle_method(tag: NameSeg, lifecycle: &Arc<ProxyLifecycle>, entry: EntryPoint) -> MethodSlot {
    let lifecycle = Arc::clone(lifecycle);
    MethodSlot::defined(tag, 0, move |inv| {
        entry(&lifecycle, inv.resolver, inv.host);
        Value::Uninitialized
    })
}

/// Builds the proxy device for the GPU at `target`.
///
/// The block declares the target's enable, disable and (for the negotiated
/// teardown) `_DSM` methods as forward references and adds a proxy with
/// `_HID`, `_INI`, `_ON`, `_OFF` and `_STA` under `config.scope`. The proxy's
/// methods resolve their targets in whatever namespace evaluates them.
pub fn proxy_fragment(config: &ProxyConfig, target: &NamespacePath) -> ProxyFragment {
    let lifecycle = Arc::new(ProxyLifecycle::from_config(config, target));

    let mut block = DefinitionBlock::new("DGPUPRXY")
        .external(target.clone(), ObjectType::Device)
        .external(target.join(config.enable_method), ObjectType::Method { arity: 0 })
        .external(target.join(config.disable_method), ObjectType::Method { arity: 0 });
    if let Teardown::Negotiated(negotiation) = &config.teardown {
        block = block.external(target.join(negotiation.method), ObjectType::Method { arity: 4 });
    }

    let status = Arc::clone(&lifecycle);
    let device = DeviceNode::new(config.device_name)
        .with_property(names::HID, config.hardware_id.as_str())
        .with_method(lifecycle_method(names::INI, &lifecycle, ProxyLifecycle::init))
        .with_method(lifecycle_method(names::ON, &lifecycle, ProxyLifecycle::power_on))
        .with_method(lifecycle_method(names::OFF, &lifecycle, ProxyLifecycle::power_off))
        .with_method(MethodSlot::defined(names::STA, 0, move |inv| {
            Value::Integer(status.status(inv.host))
        }));

    ProxyFragment {
        block: block.scope(ScopeBlock::new(config.scope.clone()).device(device)),
        device: config.scope.join(config.device_name),
        lifecycle,
    }
}

/// Path of the spoofed `_DSM` that [`spoof_fragment`] adds for `target`.
pub fn spoof_dsm_path(config: &SpoofConfig, target: &NamespacePath) -> NamespacePath {
    match &config.placement {
        SpoofPlacement::InPlace => target.join(names::DSM),
        SpoofPlacement::Bridged { bridge, device } => {
            target.join(*bridge).join(*device).join(names::DSM)
        }
    }
}

/// Builds the identity-spoof fragment for the GPU at `target`.
pub fn spoof_fragment(config: &SpoofConfig, target: &NamespacePath) -> DefinitionBlock {
    let dsm = IdentityResponder::from_config(config).into_method();
    let block = DefinitionBlock::new("GPUSPOOF").external(target.clone(), ObjectType::Device);

    let scope = match &config.placement {
        SpoofPlacement::InPlace => ScopeBlock::new(target.clone()).method(dsm),
        SpoofPlacement::Bridged { bridge, device } => ScopeBlock::new(target.clone()).device(
            DeviceNode::new(*bridge)
                .with_property(names::ADR, 0u64)
                .with_child(
                    DeviceNode::new(*device)
                        .with_property(names::ADR, 0u64)
                        .with_method(dsm),
                ),
        ),
    };
    block.scope(scope)
}
