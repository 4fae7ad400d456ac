use ssdt_namespace::{NameSeg, NamespacePath};

use crate::catalog::{DisableMethod, TemplateKind};
use crate::device_id::DeviceId;
use crate::error::TemplateError;

pub const ADDR_PLACEHOLDER: &str = "{ADDR}";
const MODEL_PLACEHOLDER: &str = "{MODEL}";
const DEVID_PLACEHOLDER: &str = "{DEVID}";
const DEVID_LO_PLACEHOLDER: &str = "{DEVID_LO}";
const DEVID_HI_PLACEHOLDER: &str = "{DEVID_HI}";
const PROXY_PLACEHOLDER: &str = "{PROXY}";

/// Disable fragments name their proxy device from this stem and the path's
/// position: `DGP1`, `DGP2`, ...
const PROXY_STEM: &str = "DGPU";

const PEGP: NameSeg = NameSeg::from_static(b"PEGP");

/// A filled-in template, ready to be written out and compiled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub kind: TemplateKind,
    pub file_name: String,
    pub source: String,
}

/// Renders `path` the way templates reference it after their leading `\`:
/// `\_SB.PCI0.PEGP` becomes `_SB_.PCI0.PEGP`.
pub fn asl_path(path: &NamespacePath) -> Result<String, TemplateError> {
    if !path.is_absolute() {
        return Err(TemplateError::RelativePath(path.clone()));
    }
    let segments: Vec<&str> = path.segments().iter().map(NameSeg::as_str).collect();
    Ok(segments.join("."))
}

/// Replaces every `{ADDR}` token in `template` with `path`.
pub fn substitute_addr(template: &str, path: &NamespacePath) -> Result<String, TemplateError> {
    if !template.contains(ADDR_PLACEHOLDER) {
        return Err(TemplateError::MissingPlaceholder);
    }
    Ok(template.replace(ADDR_PLACEHOLDER, &asl_path(path)?))
}

/// The scope above the last `PEGP` segment of `path`.
pub fn pegp_parent(path: &NamespacePath) -> Result<NamespacePath, TemplateError> {
    let segments = path.segments();
    match segments.iter().rposition(|seg| *seg == PEGP) {
        Some(idx) if idx > 0 => Ok(NamespacePath::absolute(segments[..idx].iter().copied())),
        _ => Err(TemplateError::NoPegp(path.clone())),
    }
}

/// Renders one disable fragment per path, named `SSDT-DISABLE-<METHOD>-<n>.dsl`.
/// Fragments that add a proxy device name it after `n` so all of them can be
/// loaded together.
pub fn render_disable(
    paths: &[NamespacePath],
    method: DisableMethod,
) -> Result<Vec<Rendered>, TemplateError> {
    if paths.is_empty() {
        return Err(TemplateError::NoPaths);
    }
    let kind = method.template();
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let too_many = || TemplateError::TooManyPaths(paths.len());
            let ordinal = u32::try_from(i + 1).map_err(|_| too_many())?;
            let proxy = NameSeg::numbered(PROXY_STEM, ordinal).map_err(|_| too_many())?;
            let file_name = format!(
                "SSDT-DISABLE-{}-{ordinal}.dsl",
                method.as_str().to_ascii_uppercase(),
            );
            let source =
                substitute_addr(kind.source(), path)?.replace(PROXY_PLACEHOLDER, proxy.as_str());
            tracing::debug!(file = %file_name, %path, "rendered disable fragment");
            Ok(Rendered {
                kind,
                file_name,
                source,
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpoofKind {
    /// `_DSM` added to the GPU itself; reports device id and model.
    Generic,
    /// GPU re-parented under a bridge below `PEGP`; reports device id only.
    Rx6x50,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpoofRequest {
    /// The GPU's namespace path.
    pub path: NamespacePath,
    pub device_id: DeviceId,
    pub model: Option<String>,
    pub kind: SpoofKind,
}

fn validate_model(model: Option<&str>) -> Result<&str, TemplateError> {
    let model = model.map(str::trim).filter(|m| !m.is_empty());
    let model = model.ok_or(TemplateError::MissingModel)?;
    let embeddable = model
        .chars()
        .all(|c| (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\');
    if !embeddable {
        return Err(TemplateError::InvalidModel(model.to_owned()));
    }
    Ok(model)
}

/// Renders the identity-spoof fragment for `request`.
pub fn render_spoof(request: &SpoofRequest) -> Result<Rendered, TemplateError> {
    let (kind, scope, file_name) = match request.kind {
        SpoofKind::Generic => (
            TemplateKind::SpoofGeneric,
            request.path.clone(),
            "SSDT-SPOOF-GPU.dsl",
        ),
        SpoofKind::Rx6x50 => (
            TemplateKind::SpoofRx6x50,
            pegp_parent(&request.path)?,
            "SSDT-SPOOF-RX6x50.dsl",
        ),
    };

    let [lo, hi] = request.device_id.le_bytes();
    let mut source = substitute_addr(kind.source(), &scope)?
        .replace(DEVID_LO_PLACEHOLDER, &format!("0x{lo:02X}"))
        .replace(DEVID_HI_PLACEHOLDER, &format!("0x{hi:02X}"))
        .replace(DEVID_PLACEHOLDER, &request.device_id.to_string());
    if kind == TemplateKind::SpoofGeneric {
        source = source.replace(MODEL_PLACEHOLDER, validate_model(request.model.as_deref())?);
    }

    tracing::debug!(file = file_name, path = %request.path, device_id = %request.device_id, "rendered spoof fragment");
    Ok(Rendered {
        kind,
        file_name: file_name.to_owned(),
        source,
    })
}
