use ssdt_namespace::{names, NameSeg, NamespacePath, PathError};

/// Proxy devices are named from this stem and their ordinal: `DGP1`, `DGP2`, ...
pub const PROXY_NAME_STEM: &str = "DGPU";

/// Identity string the guard probes for before answering identity queries.
pub const DARWIN: &str = "Darwin";

/// `ToUUID ("a486d8f8-0bda-471b-a72b-6042a6b5bee0")`, the GPU power-control
/// `_DSM` group used by hybrid-graphics laptops.
pub const OPTIMUS_DSM_GUID: [u8; 16] = [
    0xF8, 0xD8, 0x86, 0xA4, 0xDA, 0x0B, 0x1B, 0x47, 0xA7, 0x2B, 0x60, 0x42, 0xA6, 0xB5, 0xBE, 0xE0,
];
pub const OPTIMUS_DSM_REVISION: u64 = 0x0100;
/// Function index of the power-control call.
pub const OPTIMUS_POWER_CONTROL: u64 = 0x1A;
/// Payload asking the firmware to cut power to the GPU on the next `_PS3`.
pub const OPTIMUS_POWER_OFF_PAYLOAD: [u8; 4] = [0x01, 0x00, 0x00, 0x03];

/// The capability-negotiation call sent ahead of the disable forward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NegotiationConfig {
    /// Method on the target that receives the call (normally `_DSM`).
    pub method: NameSeg,
    pub guid: [u8; 16],
    pub revision: u64,
    pub function: u64,
    pub payload: Vec<u8>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            method: names::DSM,
            guid: OPTIMUS_DSM_GUID,
            revision: OPTIMUS_DSM_REVISION,
            function: OPTIMUS_POWER_CONTROL,
            payload: OPTIMUS_POWER_OFF_PAYLOAD.to_vec(),
        }
    }
}

/// How the proxy's power-off entry point tears the target down.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Teardown {
    /// Forward straight to the disable method.
    #[default]
    Plain,
    /// Send the negotiation call first, then forward to the disable method.
    Negotiated(NegotiationConfig),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Scope the proxy device is added under.
    pub scope: NamespacePath,
    /// Must be unique per target when several proxies share `scope`.
    pub device_name: NameSeg,
    pub hardware_id: String,
    /// Target method forwarded to on power-on.
    pub enable_method: NameSeg,
    /// Target method forwarded to on power-off.
    pub disable_method: NameSeg,
    pub teardown: Teardown,
    /// The proxy reports itself present (`_STA` = 0x0F) only when the host
    /// claims this identity.
    pub platform_identity: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            scope: NamespacePath::absolute([names::SB]),
            device_name: NameSeg::from_static(b"DGP1"),
            hardware_id: "DGPU1000".to_owned(),
            enable_method: names::PS0,
            disable_method: names::PS3,
            teardown: Teardown::Plain,
            platform_identity: DARWIN.to_owned(),
        }
    }
}

impl ProxyConfig {
    /// The two-step teardown variant for hybrid-graphics GPUs.
    pub fn negotiated() -> Self {
        Self {
            teardown: Teardown::Negotiated(NegotiationConfig::default()),
            ..Self::default()
        }
    }

    /// Names the proxy for the `ordinal`-th target (1-based).
    pub fn with_ordinal(mut self, ordinal: u32) -> Result<Self, PathError> {
        self.device_name = NameSeg::numbered(PROXY_NAME_STEM, ordinal)?;
        Ok(self)
    }
}

/// Where the spoofed `_DSM` is attached relative to the target path.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SpoofPlacement {
    /// Add `_DSM` to the target device itself.
    #[default]
    InPlace,
    /// Add a bridge device under the target and the spoofed GPU device under
    /// the bridge, both at address 0.
    Bridged { bridge: NameSeg, device: NameSeg },
}

impl SpoofPlacement {
    pub fn bridged() -> Self {
        Self::Bridged {
            bridge: NameSeg::from_static(b"BRG0"),
            device: NameSeg::from_static(b"GFX0"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpoofConfig {
    pub device_id: u16,
    /// Optional display name reported as `"model"`.
    pub model: Option<String>,
    pub placement: SpoofPlacement,
    pub platform_identity: String,
}

impl SpoofConfig {
    pub fn new(device_id: u16) -> Self {
        Self {
            device_id,
            model: None,
            placement: SpoofPlacement::InPlace,
            platform_identity: DARWIN.to_owned(),
        }
    }
}
