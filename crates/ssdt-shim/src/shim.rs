use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use ssdt_namespace::{HostOracle, InvokeError, NamespacePath, Resolver, Value};

use crate::config::ProxyConfig;
use crate::rule::{ForwardingRule, LifecycleHook};

/// What happened to one conditional call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The target did not resolve; nothing was called.
    Absent,
    /// The target ran. The value is recorded but never consulted.
    Invoked(Value),
    /// The target resolved but the host rejected the call.
    Failed(InvokeError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub path: NamespacePath,
    pub outcome: StepOutcome,
}

/// The calls one entry point made, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub hook: LifecycleHook,
    pub steps: Vec<Step>,
}

impl DispatchReport {
    fn new(hook: LifecycleHook) -> Self {
        Self {
            hook,
            steps: Vec::new(),
        }
    }

    /// Paths of the targets that were actually invoked.
    pub fn invoked(&self) -> impl Iterator<Item = &NamespacePath> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Invoked(_)))
            .map(|s| &s.path)
    }

    /// True when no target resolved.
    pub fn is_noop(&self) -> bool {
        self.steps.iter().all(|s| s.outcome == StepOutcome::Absent)
    }
}

/// Runs forwarding rules against whatever namespace is current at call time.
///
/// Every target is resolved immediately before use and skipped when absent;
/// no outcome is ever surfaced to the host as an error.
#[derive(Clone, Debug, Default)]
pub struct ForwardingShim {
    rules: Vec<ForwardingRule>,
}

impl ForwardingShim {
    pub fn new(rules: impl IntoIterator<Item = ForwardingRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn rules(&self) -> &[ForwardingRule] {
        &self.rules
    }

    /// Runs the rules registered for `hook`, in registration order. A rule's
    /// pre-action and its forward are checked independently: an absent or
    /// failing pre-action never blocks the forward.
    pub fn dispatch(
        &self,
        hook: LifecycleHook,
        resolver: &dyn Resolver,
        host: &dyn HostOracle,
    ) -> DispatchReport {
        let mut report = DispatchReport::new(hook);
        for rule in self.rules.iter().filter(|r| r.hook == hook) {
            if let Some(call) = &rule.pre_action {
                report
                    .steps
                    .push(forward(hook, resolver, host, &call.target, &call.args()));
            }
            report
                .steps
                .push(forward(hook, resolver, host, &rule.target, &[]));
        }
        report
    }
}

fn forward(
    hook: LifecycleHook,
    resolver: &dyn Resolver,
    host: &dyn HostOracle,
    path: &NamespacePath,
    args: &[Value],
) -> Step {
    let outcome = match resolver.resolve(path) {
        None => {
            tracing::debug!(%hook, target = %path, "forward target absent, skipping");
            StepOutcome::Absent
        }
        Some(slot) => match slot.invoke(resolver, host, args) {
            Ok(value) => {
                tracing::trace!(%hook, target = %path, "forwarded");
                StepOutcome::Invoked(value)
            }
            Err(err) => {
                tracing::warn!(%hook, target = %path, "forward rejected: {err}");
                StepOutcome::Failed(err)
            }
        },
    };
    Step {
        path: path.clone(),
        outcome,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerState {
    Uninit = 0,
    Off = 1,
    On = 2,
}

impl PowerState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => PowerState::Off,
            2 => PowerState::On,
            _ => PowerState::Uninit,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerState::Uninit => "uninit",
            PowerState::Off => "off",
            PowerState::On => "on",
        })
    }
}

/// `_STA` value of a present, enabled, shown and functioning device.
pub const STA_PRESENT: u64 = 0x0F;

/// The proxy device's lifecycle: forwarding rules plus its `UNINIT -> OFF <-> ON`
/// state.
///
/// The state only records which entry point ran last. It does not gate
/// forwarding: repeated calls forward again, and idempotence is left to the
/// target methods.
#[derive(Debug)]
pub struct ProxyLifecycle {
    shim: ForwardingShim,
    state: AtomicU8,
    platform_identity: String,
}

impl ProxyLifecycle {
    pub fn new(shim: ForwardingShim, platform_identity: impl Into<String>) -> Self {
        Self {
            shim,
            state: AtomicU8::new(PowerState::Uninit as u8),
            platform_identity: platform_identity.into(),
        }
    }

    pub fn from_config(config: &ProxyConfig, target: &NamespacePath) -> Self {
        Self::new(
            ForwardingShim::new(ForwardingRule::for_proxy(config, target)),
            config.platform_identity.clone(),
        )
    }

    pub fn shim(&self) -> &ForwardingShim {
        &self.shim
    }

    pub fn state(&self) -> PowerState {
        PowerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Runs the power-off path, then any rules registered for `Init`. A
    /// freshly initialised proxy is OFF.
    pub fn init(&self, resolver: &dyn Resolver, host: &dyn HostOracle) -> DispatchReport {
        let mut report = self.shim.dispatch(LifecycleHook::PowerOff, resolver, host);
        report.hook = LifecycleHook::Init;
        report
            .steps
            .extend(self.shim.dispatch(LifecycleHook::Init, resolver, host).steps);
        self.enter(PowerState::Off);
        report
    }

    pub fn power_on(&self, resolver: &dyn Resolver, host: &dyn HostOracle) -> DispatchReport {
        let report = self.shim.dispatch(LifecycleHook::PowerOn, resolver, host);
        self.enter(PowerState::On);
        report
    }

    pub fn power_off(&self, resolver: &dyn Resolver, host: &dyn HostOracle) -> DispatchReport {
        let report = self.shim.dispatch(LifecycleHook::PowerOff, resolver, host);
        self.enter(PowerState::Off);
        report
    }

    /// `_STA`: present only when the host claims the configured identity.
    pub fn status(&self, host: &dyn HostOracle) -> u64 {
        if host.query_platform_identity(&self.platform_identity) {
            STA_PRESENT
        } else {
            0
        }
    }

    fn enter(&self, next: PowerState) {
        let prev = PowerState::from_u8(self.state.swap(next as u8, Ordering::AcqRel));
        if prev != next {
            tracing::debug!(from = ?prev, to = ?next, "proxy power state changed");
        }
    }
}

/// A proxy lifecycle bound to an injected namespace and host.
#[derive(Debug)]
pub struct ProxyDevice<R, H> {
    resolver: R,
    host: H,
    lifecycle: ProxyLifecycle,
}

impl<R: Resolver, H: HostOracle> ProxyDevice<R, H> {
    pub fn new(resolver: R, host: H, lifecycle: ProxyLifecycle) -> Self {
        Self {
            resolver,
            host,
            lifecycle,
        }
    }

    pub fn from_config(resolver: R, host: H, config: &ProxyConfig, target: &NamespacePath) -> Self {
        Self::new(resolver, host, ProxyLifecycle::from_config(config, target))
    }

    pub fn lifecycle(&self) -> &ProxyLifecycle {
        &self.lifecycle
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn state(&self) -> PowerState {
        self.lifecycle.state()
    }

    pub fn init(&self) -> DispatchReport {
        self.lifecycle.init(&self.resolver, &self.host)
    }

    pub fn power_on(&self) -> DispatchReport {
        self.lifecycle.power_on(&self.resolver, &self.host)
    }

    pub fn power_off(&self) -> DispatchReport {
        self.lifecycle.power_off(&self.resolver, &self.host)
    }

    pub fn status(&self) -> u64 {
        self.lifecycle.status(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ssdt_namespace::{MethodSlot, NameSeg, StaticHost};

    use super::*;

    /// A flat directory of recording methods, keyed by absolute path.
    #[derive(Default)]
    struct FakeDirectory {
        methods: Vec<(NamespacePath, MethodSlot)>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeDirectory {
        fn with(mut self, path: &str, arity: u8) -> Self {
            let path = NamespacePath::parse(path).unwrap();
            let calls = self.calls.clone();
            let label = path.to_string();
            let tag = path.name().unwrap();
            self.methods.push((
                path,
                MethodSlot::defined(tag, arity, move |_| {
                    calls.lock().unwrap().push(label.clone());
                    Value::Uninitialized
                }),
            ));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Resolver for FakeDirectory {
        fn resolve(&self, path: &NamespacePath) -> Option<MethodSlot> {
            self.methods
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, slot)| slot.clone())
        }
    }

    fn target() -> NamespacePath {
        NamespacePath::parse("\\_SB.PCI0.PEG0.PEGP").unwrap()
    }

    #[test]
    fn starts_uninitialised_and_follows_transitions() {
        let dir = FakeDirectory::default().with("\\_SB.PCI0.PEG0.PEGP._PS0", 0);
        let proxy = ProxyDevice::from_config(&dir, StaticHost::darwin(), &ProxyConfig::default(), &target());

        assert_eq!(proxy.state(), PowerState::Uninit);
        proxy.init();
        assert_eq!(proxy.state(), PowerState::Off);
        proxy.power_on();
        assert_eq!(proxy.state(), PowerState::On);
        proxy.power_off();
        assert_eq!(proxy.state(), PowerState::Off);
    }

    #[test]
    fn missing_targets_make_every_entry_point_inert() {
        let dir = FakeDirectory::default();
        let proxy = ProxyDevice::from_config(&dir, StaticHost::darwin(), &ProxyConfig::negotiated(), &target());

        assert!(proxy.init().is_noop());
        assert!(proxy.power_on().is_noop());
        assert!(proxy.power_off().is_noop());
        assert!(dir.calls().is_empty());
    }

    #[test]
    fn pre_action_failure_does_not_block_the_forward() {
        // `_DSM` declared with the wrong arity: the host rejects the call.
        let dir = FakeDirectory::default()
            .with("\\_SB.PCI0.PEG0.PEGP._DSM", 0)
            .with("\\_SB.PCI0.PEG0.PEGP._PS3", 0);
        let proxy = ProxyDevice::from_config(&dir, StaticHost::darwin(), &ProxyConfig::negotiated(), &target());

        let report = proxy.power_off();
        assert!(matches!(
            report.steps[0].outcome,
            StepOutcome::Failed(InvokeError::ArgCount { expected: 0, found: 4, .. })
        ));
        assert_eq!(report.steps[1].outcome, StepOutcome::Invoked(Value::Uninitialized));
        assert_eq!(dir.calls(), vec!["\\_SB_.PCI0.PEG0.PEGP._PS3"]);
    }

    #[test]
    fn init_rules_run_after_the_power_off_path() {
        let dir = FakeDirectory::default()
            .with("\\_SB.PCI0.PEG0.PEGP._PS3", 0)
            .with("\\_SB.PCI0.PEG0.PEGP.XINI", 0);
        let mut rules = ForwardingRule::for_proxy(&ProxyConfig::default(), &target());
        rules.push(ForwardingRule::new(
            LifecycleHook::Init,
            target().join(NameSeg::from_static(b"XINI")),
        ));
        let proxy = ProxyDevice::new(
            &dir,
            StaticHost::darwin(),
            ProxyLifecycle::new(ForwardingShim::new(rules), "Darwin"),
        );

        let report = proxy.init();
        assert_eq!(report.hook, LifecycleHook::Init);
        assert_eq!(
            dir.calls(),
            vec!["\\_SB_.PCI0.PEG0.PEGP._PS3", "\\_SB_.PCI0.PEG0.PEGP.XINI"]
        );
    }

    #[test]
    fn status_tracks_the_platform_identity() {
        let dir = FakeDirectory::default();
        let present = ProxyDevice::from_config(&dir, StaticHost::darwin(), &ProxyConfig::default(), &target());
        assert_eq!(present.status(), STA_PRESENT);

        let hidden = ProxyDevice::from_config(&dir, StaticHost::default(), &ProxyConfig::default(), &target());
        assert_eq!(hidden.status(), 0);
    }
}
