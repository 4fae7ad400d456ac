#![forbid(unsafe_code)]

//! Conditional forwarding shim and identity-spoof responder for GPU patch
//! fragments.
//!
//! A proxy device's lifecycle entry points (`init`, `power-on`, `power-off`)
//! look up the real device's methods at evaluation time and call them only if
//! they exist. An identification query (`_DSM`) on the GPU answers with a
//! chosen device id instead of the hardware's. Nothing here reports an error
//! to the host: absent targets and unsupported queries degrade to no-ops and
//! the fixed "unsupported" buffer.

mod config;
mod fragment;
mod identity;
mod rule;
mod shim;

pub use crate::config::{
    NegotiationConfig, ProxyConfig, SpoofConfig, SpoofPlacement, Teardown, DARWIN,
    OPTIMUS_DSM_GUID, OPTIMUS_DSM_REVISION, OPTIMUS_POWER_CONTROL, OPTIMUS_POWER_OFF_PAYLOAD,
    PROXY_NAME_STEM,
};
pub use crate::fragment::{proxy_fragment, spoof_dsm_path, spoof_fragment, ProxyFragment};
pub use crate::identity::{
    device_id_bytes, DsmArgs, IdentityResponder, IdentityResponse, DEVICE_ID_KEY, DSM_UNSUPPORTED,
    MODEL_KEY,
};
pub use crate::rule::{CapabilityCall, ForwardingRule, LifecycleHook};
pub use crate::shim::{
    DispatchReport, ForwardingShim, PowerState, ProxyDevice, ProxyLifecycle, Step, StepOutcome,
    STA_PRESENT,
};
