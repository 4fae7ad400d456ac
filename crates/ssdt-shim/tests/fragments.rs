use std::sync::{Arc, Mutex};

use ssdt_namespace::{
    names, DeviceNode, MethodSlot, NameSeg, Namespace, NamespaceError, NamespacePath, StaticHost,
    Value,
};
use ssdt_shim::{
    proxy_fragment, spoof_dsm_path, spoof_fragment, PowerState, ProxyConfig, SpoofConfig,
    SpoofPlacement, STA_PRESENT,
};

fn seg(text: &str) -> NameSeg {
    NameSeg::parse(text).unwrap()
}

fn path(text: &str) -> NamespacePath {
    NamespacePath::parse(text).unwrap()
}

fn gpu_namespace(host: StaticHost, log: &Arc<Mutex<Vec<String>>>) -> Namespace {
    let record = |tag: NameSeg, arity: u8| {
        let log = Arc::clone(log);
        MethodSlot::defined(tag, arity, move |_| {
            log.lock().unwrap().push(tag.to_string());
            Value::Uninitialized
        })
    };
    let mut ns = Namespace::with_host(host);
    ns.add_device(
        &NamespacePath::root(),
        DeviceNode::new(names::SB).with_child(
            DeviceNode::new(seg("PCI0")).with_child(
                DeviceNode::new(seg("PEG0")).with_child(
                    DeviceNode::new(seg("PEGP"))
                        .with_property(names::ADR, 0u64)
                        .with_method(record(names::PS0, 0))
                        .with_method(record(names::PS3, 0))
                        .with_method(record(names::DSM, 4)),
                ),
            ),
        ),
    )
    .unwrap();
    ns
}

#[test]
fn loaded_proxy_forwards_through_the_namespace() {
    let log = Arc::default();
    let mut ns = gpu_namespace(StaticHost::darwin(), &log);
    let fragment = proxy_fragment(&ProxyConfig::negotiated(), &path("\\_SB.PCI0.PEG0.PEGP"));
    let device = fragment.device.clone();
    let lifecycle = Arc::clone(&fragment.lifecycle);

    let summary = ns.load(fragment.block).unwrap();
    assert_eq!(summary.devices_added, 1);
    assert!(summary.unresolved_externals.is_empty());
    assert_eq!(
        ns.evaluate(&device.join(names::HID), &[]).unwrap(),
        Value::String("DGPU1000".into())
    );

    ns.evaluate(&device.join(names::INI), &[]).unwrap();
    assert_eq!(lifecycle.state(), PowerState::Off);
    ns.evaluate(&device.join(names::ON), &[]).unwrap();
    assert_eq!(lifecycle.state(), PowerState::On);
    ns.evaluate(&device.join(names::OFF), &[]).unwrap();
    assert_eq!(lifecycle.state(), PowerState::Off);

    assert_eq!(
        *log.lock().unwrap(),
        vec!["_DSM", "_PS3", "_PS0", "_DSM", "_PS3"]
    );
    assert_eq!(
        ns.evaluate(&device.join(names::STA), &[]).unwrap(),
        Value::Integer(STA_PRESENT)
    );
}

#[test]
fn proxy_for_a_missing_gpu_loads_but_stays_inert() {
    let log = Arc::default();
    let mut ns = gpu_namespace(StaticHost::new(["Windows 2015"]), &log);
    let fragment = proxy_fragment(&ProxyConfig::negotiated(), &path("\\_SB.PCI0.RP05.PXSX"));
    let device = fragment.device.clone();

    let summary = ns.load(fragment.block).unwrap();
    assert_eq!(summary.unresolved_externals.len(), 4);

    ns.evaluate(&device.join(names::INI), &[]).unwrap();
    ns.evaluate(&device.join(names::ON), &[]).unwrap();
    ns.evaluate(&device.join(names::OFF), &[]).unwrap();
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(ns.evaluate(&device.join(names::STA), &[]).unwrap(), Value::Integer(0));
}

#[test]
fn forward_references_are_not_called_until_defined() {
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let mut ns = Namespace::with_host(StaticHost::darwin());
    ns.add_device(
        &NamespacePath::root(),
        DeviceNode::new(names::SB).with_child(DeviceNode::new(seg("GFX0"))),
    )
    .unwrap();

    let fragment = proxy_fragment(&ProxyConfig::default(), &path("\\_SB.GFX0"));
    let device = fragment.device.clone();
    let summary = ns.load(fragment.block).unwrap();
    assert_eq!(summary.unresolved_externals.len(), 2);
    assert!(!ns.contains(&path("\\_SB.GFX0._PS3")));
    ns.evaluate(&device.join(names::OFF), &[]).unwrap();
    assert!(log.lock().unwrap().is_empty());

    let seen = Arc::clone(&log);
    ns.add_method(
        &path("\\_SB.GFX0"),
        MethodSlot::defined(names::PS3, 0, move |_| {
            seen.lock().unwrap().push("_PS3".into());
            Value::Uninitialized
        }),
    )
    .unwrap();
    ns.evaluate(&device.join(names::OFF), &[]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["_PS3"]);
}

#[test]
fn proxy_cannot_be_loaded_twice() {
    let log = Arc::default();
    let mut ns = gpu_namespace(StaticHost::darwin(), &log);
    let target = path("\\_SB.PCI0.PEG0.PEGP");
    ns.load(proxy_fragment(&ProxyConfig::default(), &target).block)
        .unwrap();
    assert!(matches!(
        ns.load(proxy_fragment(&ProxyConfig::default(), &target).block),
        Err(NamespaceError::AlreadyExists(_))
    ));
}

#[test]
fn numbered_proxies_for_two_gpus_load_side_by_side() {
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let mut ns = gpu_namespace(StaticHost::darwin(), &log);
    let seen = Arc::clone(&log);
    ns.add_device(
        &path("\\_SB.PCI0"),
        DeviceNode::new(seg("RP05")).with_child(DeviceNode::new(seg("PXSX")).with_method(
            MethodSlot::defined(names::PS3, 0, move |_| {
                seen.lock().unwrap().push("PXSX._PS3".into());
                Value::Uninitialized
            }),
        )),
    )
    .unwrap();

    let targets = [path("\\_SB.PCI0.PEG0.PEGP"), path("\\_SB.PCI0.RP05.PXSX")];
    let mut devices = Vec::new();
    for (ordinal, target) in (1..).zip(&targets) {
        let config = ProxyConfig::negotiated().with_ordinal(ordinal).unwrap();
        let fragment = proxy_fragment(&config, target);
        assert!(format!("{fragment:?}").contains(&format!("DGP{ordinal}")));
        devices.push(fragment.device.clone());
        ns.load(fragment.block).unwrap();
    }
    assert_eq!(devices[0].to_string(), "\\_SB_.DGP1");
    assert_eq!(devices[1].to_string(), "\\_SB_.DGP2");

    for device in &devices {
        ns.evaluate(&device.join(names::OFF), &[]).unwrap();
    }
    assert_eq!(*log.lock().unwrap(), vec!["_DSM", "_PS3", "PXSX._PS3"]);
}

fn dsm_query(function: u64) -> Vec<Value> {
    vec![
        Value::Buffer(vec![0; 16]),
        Value::Integer(0),
        Value::Integer(function),
        Value::Package(Vec::new()),
    ]
}

#[test]
fn bridged_spoof_answers_identity_queries() {
    let mut ns = Namespace::with_host(StaticHost::darwin());
    ns.add_device(
        &NamespacePath::root(),
        DeviceNode::new(names::SB).with_child(
            DeviceNode::new(seg("PCI0"))
                .with_child(DeviceNode::new(seg("PEG0")).with_child(DeviceNode::new(seg("PEGP")))),
        ),
    )
    .unwrap();

    let mut config = SpoofConfig::new(0xCDAB);
    config.placement = SpoofPlacement::bridged();
    let target = path("\\_SB.PCI0.PEG0.PEGP");
    ns.load(spoof_fragment(&config, &target)).unwrap();

    let dsm = spoof_dsm_path(&config, &target);
    assert_eq!(dsm.to_string(), "\\_SB_.PCI0.PEG0.PEGP.BRG0.GFX0._DSM");
    assert_eq!(
        ns.evaluate(&dsm, &dsm_query(0)).unwrap(),
        Value::Buffer(vec![0x03])
    );
    assert_eq!(
        ns.evaluate(&dsm, &dsm_query(1)).unwrap(),
        Value::Package(vec![
            Value::String("device-id".into()),
            Value::Buffer(vec![0xAB, 0xCD, 0x00, 0x00]),
        ])
    );
    assert_eq!(
        ns.evaluate(&path("\\_SB.PCI0.PEG0.PEGP.BRG0.GFX0._ADR"), &[]).unwrap(),
        Value::Integer(0)
    );
}

#[test]
fn in_place_spoof_is_gated_on_the_host_identity() {
    let mut ns = Namespace::with_host(StaticHost::new(["Windows 2015"]));
    ns.add_device(
        &NamespacePath::root(),
        DeviceNode::new(names::SB).with_child(DeviceNode::new(seg("GFX0"))),
    )
    .unwrap();

    let config = SpoofConfig::new(0x73FF);
    let target = path("\\_SB.GFX0");
    ns.load(spoof_fragment(&config, &target)).unwrap();

    let dsm = spoof_dsm_path(&config, &target);
    assert_eq!(
        ns.evaluate(&dsm, &dsm_query(1)).unwrap(),
        Value::Buffer(vec![0x03])
    );

    ns.set_host(StaticHost::darwin());
    assert_eq!(
        ns.evaluate(&dsm, &dsm_query(1)).unwrap(),
        Value::Package(vec![
            Value::String("device-id".into()),
            Value::Buffer(vec![0xFF, 0x73, 0x00, 0x00]),
        ])
    );
}

#[test]
fn in_place_spoof_conflicts_with_a_native_dsm() {
    let log = Arc::default();
    let mut ns = gpu_namespace(StaticHost::darwin(), &log);
    let err = ns
        .load(spoof_fragment(&SpoofConfig::new(0x73FF), &path("\\_SB.PCI0.PEG0.PEGP")))
        .unwrap_err();
    assert!(matches!(err, NamespaceError::AlreadyExists(p) if p.name() == Some(names::DSM)));
}
