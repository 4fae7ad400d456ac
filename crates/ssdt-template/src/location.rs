//! Conversion between the location paths Windows reports for a device and
//! the forms firmware config and ASL use.
//!
//! * Windows PCI path: `PCIROOT(0)#PCI(0100)#PCI(0000)`
//! * device path: `PciRoot(0x0)/Pci(0x1,0x0)/Pci(0x0,0x0)`
//! * Windows ACPI path: `ACPI(_SB_)#ACPI(PCI0)#ACPI(PEGP)` → `\_SB_.PCI0.PEGP`

use core::fmt;

use ssdt_namespace::{NameSeg, NamespacePath};

use crate::error::LocationPathError;

const MAX_DEVICE: u32 = 0x1F;
const MAX_FUNCTION: u32 = 0x07;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PciHop {
    pub device: u8,
    pub function: u8,
}

impl PciHop {
    pub fn new(device: u32, function: u32) -> Result<Self, LocationPathError> {
        if device > MAX_DEVICE || function > MAX_FUNCTION {
            return Err(LocationPathError::OutOfRange { device, function });
        }
        Ok(Self {
            device: device as u8,
            function: function as u8,
        })
    }
}

/// A PCI device located by root bridge and the device/function hops below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PciLocation {
    pub root: u32,
    pub hops: Vec<PciHop>,
}

/// Returns the text between `prefix(` and a trailing `)`.
fn call_arg<'a>(component: &'a str, prefix: &str) -> Option<&'a str> {
    component
        .strip_prefix(prefix)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn malformed(kind: &'static str, component: &str) -> LocationPathError {
    LocationPathError::Malformed {
        kind,
        component: component.to_owned(),
    }
}

fn hex_u32(text: &str, kind: &'static str, component: &str) -> Result<u32, LocationPathError> {
    let digits = text
        .trim()
        .strip_prefix("0x")
        .or_else(|| text.trim().strip_prefix("0X"))
        .unwrap_or(text.trim());
    u32::from_str_radix(digits, 16).map_err(|_| malformed(kind, component))
}

impl PciLocation {
    /// Parses `PCIROOT(n)#PCI(ddff)#...`. The root number is decimal and each
    /// `PCI` hop is two hex bytes, device then function.
    pub fn parse_windows(text: &str) -> Result<Self, LocationPathError> {
        let mut parts = text.trim().split('#');
        let first = parts.next().filter(|p| !p.is_empty()).ok_or(LocationPathError::Empty)?;
        let root = call_arg(first, "PCIROOT").ok_or(LocationPathError::MissingRoot)?;
        let root = root
            .parse::<u32>()
            .map_err(|_| malformed("PCIROOT", first))?;

        let hops = parts
            .map(|part| {
                let arg = call_arg(part, "PCI")
                    .ok_or_else(|| LocationPathError::UnknownComponent(part.to_owned()))?;
                if arg.len() != 4 || !arg.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(malformed("PCI", part));
                }
                let device = hex_u32(&arg[..2], "PCI", part)?;
                let function = hex_u32(&arg[2..], "PCI", part)?;
                PciHop::new(device, function)
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { root, hops })
    }

    /// Parses `PciRoot(0x0)/Pci(0x1,0x0)/...`.
    pub fn parse_device_path(text: &str) -> Result<Self, LocationPathError> {
        let mut parts = text.trim().split('/');
        let first = parts.next().filter(|p| !p.is_empty()).ok_or(LocationPathError::Empty)?;
        let root = call_arg(first, "PciRoot").ok_or(LocationPathError::MissingRoot)?;
        let root = hex_u32(root, "PciRoot", first)?;

        let hops = parts
            .map(|part| {
                let arg = call_arg(part, "Pci")
                    .ok_or_else(|| LocationPathError::UnknownComponent(part.to_owned()))?;
                let (device, function) = arg.split_once(',').ok_or_else(|| malformed("Pci", part))?;
                PciHop::new(hex_u32(device, "Pci", part)?, hex_u32(function, "Pci", part)?)
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { root, hops })
    }

    pub fn to_windows(&self) -> String {
        let mut out = format!("PCIROOT({})", self.root);
        for hop in &self.hops {
            out.push_str(&format!("#PCI({:02X}{:02X})", hop.device, hop.function));
        }
        out
    }

    pub fn to_device_path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PciLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PciRoot(0x{:X})", self.root)?;
        for hop in &self.hops {
            write!(f, "/Pci(0x{:X},0x{:X})", hop.device, hop.function)?;
        }
        Ok(())
    }
}

/// Parses `ACPI(_SB_)#ACPI(PCI0)#...` into an absolute namespace path.
///
/// Windows appends the PCI hops after the last ACPI node for devices that
/// are not themselves in the namespace; those are rejected.
pub fn acpi_location_to_namespace(text: &str) -> Result<NamespacePath, LocationPathError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LocationPathError::Empty);
    }
    let segments = text
        .split('#')
        .map(|part| {
            let name = call_arg(part, "ACPI")
                .ok_or_else(|| LocationPathError::UnknownComponent(part.to_owned()))?;
            Ok(NameSeg::parse(name)?)
        })
        .collect::<Result<Vec<_>, LocationPathError>>()?;
    Ok(NamespacePath::absolute(segments))
}

/// The result of [`convert`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Converted {
    DevicePath(String),
    Windows(String),
    Namespace(NamespacePath),
}

impl fmt::Display for Converted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converted::DevicePath(s) | Converted::Windows(s) => f.write_str(s),
            Converted::Namespace(path) => write!(f, "{path}"),
        }
    }
}

/// Converts a location path to its counterpart, picking the direction from
/// the leading component.
pub fn convert(text: &str) -> Result<Converted, LocationPathError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LocationPathError::Empty);
    }
    if text.starts_with("PCIROOT") {
        Ok(Converted::DevicePath(
            PciLocation::parse_windows(text)?.to_device_path(),
        ))
    } else if text.starts_with("PciRoot") {
        Ok(Converted::Windows(
            PciLocation::parse_device_path(text)?.to_windows(),
        ))
    } else if text.starts_with("ACPI") {
        Ok(Converted::Namespace(acpi_location_to_namespace(text)?))
    } else {
        let first = text.split(['#', '/']).next().unwrap_or(text);
        Err(LocationPathError::UnknownComponent(first.to_owned()))
    }
}
