use core::fmt;
use core::str::FromStr;

use crate::error::TemplateError;

/// How a disable fragment takes the GPU out of service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisableMethod {
    /// Forward the proxy's power-off to the GPU's `_PS3`.
    S3,
    /// Like `S3`, preceded by the power-control `_DSM` call.
    Off,
    /// Rename the device so no macOS driver attaches to it.
    IoName,
}

impl DisableMethod {
    pub const ALL: [DisableMethod; 3] = [DisableMethod::S3, DisableMethod::Off, DisableMethod::IoName];

    pub fn as_str(self) -> &'static str {
        match self {
            DisableMethod::S3 => "s3",
            DisableMethod::Off => "off",
            DisableMethod::IoName => "ioname",
        }
    }

    pub fn template(self) -> TemplateKind {
        match self {
            DisableMethod::S3 => TemplateKind::DisableS3,
            DisableMethod::Off => TemplateKind::DisableOff,
            DisableMethod::IoName => TemplateKind::DisableIoName,
        }
    }
}

impl fmt::Display for DisableMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisableMethod {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisableMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TemplateError::UnknownMethod(s.to_owned()))
    }
}

/// The built-in fragment templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    DisableS3,
    DisableOff,
    DisableIoName,
    SpoofGeneric,
    SpoofRx6x50,
}

impl TemplateKind {
    /// File name of the template source.
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::DisableS3 => "SSDT-NDGP_PS3.dsl",
            TemplateKind::DisableOff => "SSDT-NDGP_OFF.dsl",
            TemplateKind::DisableIoName => "SSDT-NDGP_IOName.dsl",
            TemplateKind::SpoofGeneric => "SSDT-SH-SPOOF.dsl",
            TemplateKind::SpoofRx6x50 => "SSDT-6x50XT-GPU-SPOOF.dsl",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            TemplateKind::DisableS3 => include_str!("../templates/SSDT-NDGP_PS3.dsl"),
            TemplateKind::DisableOff => include_str!("../templates/SSDT-NDGP_OFF.dsl"),
            TemplateKind::DisableIoName => include_str!("../templates/SSDT-NDGP_IOName.dsl"),
            TemplateKind::SpoofGeneric => include_str!("../templates/SSDT-SH-SPOOF.dsl"),
            TemplateKind::SpoofRx6x50 => include_str!("../templates/SSDT-6x50XT-GPU-SPOOF.dsl"),
        }
    }
}
