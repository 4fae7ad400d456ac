//! Runs a proxy fragment against a namespace described by a JSON manifest and
//! records which host methods it called.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use ssdt_namespace::{
    names, DeviceNode, MethodSlot, NameSeg, Namespace, NamespacePath, StaticHost, Value,
};
use ssdt_shim::{proxy_fragment, ProxyConfig};

/// Host devices and the methods they define.
///
/// ```json
/// { "osi": ["Darwin"], "devices": [{ "path": "\\_SB.PCI0.PEG0.PEGP", "methods": ["_PS0", "_PS3", "_DSM"] }] }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Interfaces the host answers `true` for. Defaults to the configured one.
    #[serde(default)]
    pub osi: Option<Vec<String>>,
    #[serde(default)]
    pub devices: Vec<ManifestDevice>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDevice {
    pub path: String,
    #[serde(default)]
    pub methods: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CallRecord {
    pub method: String,
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HookTrace {
    pub hook: &'static str,
    pub calls: Vec<CallRecord>,
}

#[derive(Debug, Serialize)]
pub struct Trace {
    pub target: String,
    pub proxy: String,
    pub teardown: &'static str,
    pub unresolved: Vec<String>,
    pub hooks: Vec<HookTrace>,
    pub status: u64,
    pub state: String,
}

type CallLog = Arc<Mutex<Vec<CallRecord>>>;

fn recording_method(path: &NamespacePath, tag: NameSeg, log: &CallLog) -> MethodSlot {
    let method = path.join(tag).to_string();
    let arity = if tag == names::DSM { 4 } else { 0 };
    let log = Arc::clone(log);
    MethodSlot::defined(tag, arity, move |inv| {
        let record = CallRecord {
            method: method.clone(),
            args: inv.args.iter().map(|arg| format!("{arg:?}")).collect(),
        };
        log.lock().unwrap_or_else(PoisonError::into_inner).push(record);
        Value::Uninitialized
    })
}

/// Adds `path` and any missing ancestors as empty devices.
fn ensure_device(ns: &mut Namespace, path: &NamespacePath) -> anyhow::Result<()> {
    let mut current = NamespacePath::root();
    for seg in path.segments() {
        let next = current.join(*seg);
        if !ns.contains(&next) {
            ns.add_device(&current, DeviceNode::new(*seg))
                .with_context(|| format!("add device {next}"))?;
        }
        current = next;
    }
    Ok(())
}

/// Builds the host namespace. Each listed method records its calls in `log`;
/// `_DSM` takes four arguments, everything else none.
pub fn build_namespace(
    manifest: &Manifest,
    default_osi: &str,
    log: &CallLog,
) -> anyhow::Result<Namespace> {
    let host = match &manifest.osi {
        Some(interfaces) => StaticHost::new(interfaces.iter().cloned()),
        None => StaticHost::new([default_osi]),
    };
    let mut ns = Namespace::with_host(host);
    for device in &manifest.devices {
        let path = crate::parse_target(&device.path)?;
        ensure_device(&mut ns, &path)?;
        for method in &device.methods {
            let tag = NameSeg::parse(method)
                .with_context(|| format!("method name {method:?} on {path}"))?;
            ns.add_method(&path, recording_method(&path, tag, log))
                .with_context(|| format!("add method {method} to {path}"))?;
        }
    }
    Ok(ns)
}

/// Loads the proxy for `target`, runs `_INI`, `_ON` and `_OFF` in that order and
/// reports the host calls each one made.
pub fn run(
    manifest: &Manifest,
    default_osi: &str,
    target: &NamespacePath,
    negotiated: bool,
) -> anyhow::Result<Trace> {
    if !target.is_absolute() {
        bail!("target path {target} must be absolute");
    }
    let log = CallLog::default();
    let mut ns = build_namespace(manifest, default_osi, &log)?;

    let config = if negotiated {
        ProxyConfig::negotiated()
    } else {
        ProxyConfig::default()
    };
    let fragment = proxy_fragment(&config, target);
    let proxy = fragment.device.clone();
    let lifecycle = Arc::clone(&fragment.lifecycle);
    let summary = ns.load(fragment.block).context("load proxy fragment")?;

    let mut hooks = Vec::new();
    for (hook, tag) in [("_INI", names::INI), ("_ON", names::ON), ("_OFF", names::OFF)] {
        ns.evaluate(&proxy.join(tag), &[])
            .with_context(|| format!("evaluate {hook}"))?;
        let calls = std::mem::take(&mut *log.lock().unwrap_or_else(PoisonError::into_inner));
        tracing::debug!(hook, calls = calls.len(), "evaluated proxy method");
        hooks.push(HookTrace { hook, calls });
    }

    let status = ns
        .evaluate(&proxy.join(names::STA), &[])
        .context("evaluate _STA")?
        .as_integer()
        .unwrap_or(0);

    Ok(Trace {
        target: target.to_string(),
        proxy: proxy.to_string(),
        teardown: if negotiated { "negotiated" } else { "plain" },
        unresolved: summary
            .unresolved_externals
            .iter()
            .map(ToString::to_string)
            .collect(),
        hooks,
        status,
        state: lifecycle.state().to_string(),
    })
}
