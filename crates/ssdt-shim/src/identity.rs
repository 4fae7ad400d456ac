use std::sync::Arc;

use ssdt_namespace::{names, HostOracle, MethodSlot, Value};

use crate::config::{SpoofConfig, DARWIN};

/// Single-byte buffer returned for the function-zero probe and for hosts that
/// fail the identity guard.
pub const DSM_UNSUPPORTED: u8 = 0x03;

pub const DEVICE_ID_KEY: &str = "device-id";
pub const MODEL_KEY: &str = "model";

/// The part of an identification query (`_DSM`) the responder looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DsmArgs {
    pub function: u64,
}

impl DsmArgs {
    /// Decodes the function index (argument 2). The other arguments are not
    /// inspected. `None` when it is missing or not an integer.
    pub fn from_values(args: &[Value]) -> Option<Self> {
        let function = args.get(2)?.as_integer()?;
        Some(Self { function })
    }
}

/// Answer to an identification query. Built fresh for every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityResponse {
    Unsupported,
    /// Ordered key / byte-buffer pairs.
    Properties(Vec<(String, Vec<u8>)>),
}

impl IdentityResponse {
    /// The data object handed back to the host: `Buffer{0x03}` or a flat
    /// package `["key", Buffer{..}, ...]`.
    pub fn into_value(self) -> Value {
        match self {
            IdentityResponse::Unsupported => Value::Buffer(vec![DSM_UNSUPPORTED]),
            IdentityResponse::Properties(props) => Value::Package(
                props
                    .into_iter()
                    .flat_map(|(key, bytes)| [Value::String(key), Value::Buffer(bytes)])
                    .collect(),
            ),
        }
    }
}

/// Little-endian device id padded to the 4-byte width the host expects.
pub fn device_id_bytes(device_id: u16) -> Vec<u8> {
    let [lo, hi] = device_id.to_le_bytes();
    vec![lo, hi, 0x00, 0x00]
}

/// Answers identification queries with a fixed property list, overriding what
/// the hardware would report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityResponder {
    platform_identity: String,
    properties: Vec<(String, Vec<u8>)>,
}

impl IdentityResponder {
    /// A responder reporting only `device-id`, gated on the `Darwin` probe.
    pub fn new(device_id: u16) -> Self {
        Self {
            platform_identity: DARWIN.to_owned(),
            properties: vec![(DEVICE_ID_KEY.to_owned(), device_id_bytes(device_id))],
        }
    }

    pub fn from_config(config: &SpoofConfig) -> Self {
        let mut responder = Self::new(config.device_id)
            .with_platform_identity(config.platform_identity.clone());
        if let Some(model) = &config.model {
            responder = responder.with_model(model);
        }
        responder
    }

    pub fn with_platform_identity(mut self, identity: impl Into<String>) -> Self {
        self.platform_identity = identity.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.properties.push((key.into(), bytes.into()));
        self
    }

    /// Adds a `model` string, stored NUL-terminated as an ASL string buffer
    /// would be.
    pub fn with_model(self, model: &str) -> Self {
        let mut bytes = model.as_bytes().to_vec();
        bytes.push(0);
        self.with_property(MODEL_KEY, bytes)
    }

    pub fn properties(&self) -> &[(String, Vec<u8>)] {
        &self.properties
    }

    /// Answers a query for `function`. Function zero (the "which functions do
    /// you support" probe) and hosts failing the identity guard get
    /// [`IdentityResponse::Unsupported`].
    pub fn respond(&self, function: u64, host: &dyn HostOracle) -> IdentityResponse {
        if function == 0 {
            return IdentityResponse::Unsupported;
        }
        if !host.query_platform_identity(&self.platform_identity) {
            tracing::debug!(identity = %self.platform_identity, "identity guard failed");
            return IdentityResponse::Unsupported;
        }
        IdentityResponse::Properties(self.properties.clone())
    }

    /// Answers a raw host call. Malformed arguments degrade to
    /// [`IdentityResponse::Unsupported`].
    pub fn respond_to(&self, args: &[Value], host: &dyn HostOracle) -> IdentityResponse {
        match DsmArgs::from_values(args) {
            Some(args) => self.respond(args.function, host),
            None => {
                tracing::warn!(argc = args.len(), "malformed identification query");
                IdentityResponse::Unsupported
            }
        }
    }

    /// A `_DSM` slot backed by this responder.
    pub fn into_method(self) -> MethodSlot {
        let responder = Arc::new(self);
        MethodSlot::defined(names::DSM, 4, move |inv| {
            responder.respond_to(inv.args, inv.host).into_value()
        })
    }
}
