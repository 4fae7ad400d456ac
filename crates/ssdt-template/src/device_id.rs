use core::fmt;
use core::str::FromStr;

use crate::error::TemplateError;

/// A 16-bit PCI device id as typed by the user (`67DF`, `73ff`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeviceId(u16);

impl DeviceId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let text = text.trim();
        if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TemplateError::InvalidDeviceId(text.to_owned()));
        }
        u16::from_str_radix(text, 16)
            .map(Self)
            .map_err(|_| TemplateError::InvalidDeviceId(text.to_owned()))
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// The two bytes as they appear in the `device-id` buffer (low byte first).
    pub const fn le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
