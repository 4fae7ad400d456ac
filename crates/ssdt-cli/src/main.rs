#![forbid(unsafe_code)]

mod config;
mod simulate;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ssdt_namespace::NamespacePath;
use ssdt_template::{
    acpi_location_to_namespace, convert, render_disable, render_spoof, DeviceId, DisableMethod,
    Rendered, SpoofKind, SpoofRequest,
};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "ssdtkit",
    version,
    about = "Generate ACPI patch fragments for discrete GPUs and check how they behave."
)]
struct Args {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    /// Directory for rendered .dsl files (defaults to $SSDTKIT_OUT_DIR or ".")
    #[arg(long, value_name = "DIR", global = true)]
    out_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write fragments that power off or hide the GPUs at the given paths
    Disable {
        /// s3, off or ioname
        #[arg(long, value_name = "METHOD")]
        method: DisableMethod,

        /// ACPI paths (\_SB.PCI0.PEG0.PEGP) or Windows ACPI location paths
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Write a fragment that reports a different device id for a GPU
    Spoof {
        /// Four hex digits, e.g. 67DF
        #[arg(long, value_name = "HEX4")]
        device_id: DeviceId,

        /// Display name reported alongside the id
        #[arg(long, value_name = "NAME", conflicts_with = "rx6x50")]
        model: Option<String>,

        /// Bridge the GPU below the parent of its PEGP device (RX 6x50 XT cards)
        #[arg(long, action = clap::ArgAction::SetTrue)]
        rx6x50: bool,

        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Convert between Windows location paths, device paths and ACPI paths
    Convert {
        #[arg(value_name = "LOCATION-PATH")]
        location: String,
    },

    /// Load the power-off proxy into a namespace described by a JSON manifest,
    /// run _INI, _ON and _OFF and print the host methods they called
    Simulate {
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Send the power-control _DSM before _PS3 on power-off
        #[arg(long, action = clap::ArgAction::SetTrue)]
        teardown: bool,

        #[arg(value_name = "PATH")]
        path: String,
    },
}

/// Accepts either an ACPI path or a Windows `ACPI(..)#ACPI(..)` location path.
pub(crate) fn parse_target(text: &str) -> anyhow::Result<NamespacePath> {
    let text = text.trim();
    if text.starts_with("ACPI(") {
        return acpi_location_to_namespace(text)
            .with_context(|| format!("invalid ACPI location path {text:?}"));
    }
    let path = NamespacePath::parse(text).with_context(|| format!("invalid ACPI path {text:?}"))?;
    if !path.is_absolute() {
        bail!("ACPI path {text:?} must be absolute (start with \\)");
    }
    Ok(path)
}

fn write_outputs(out_dir: &Path, rendered: &[Rendered]) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;
    for file in rendered {
        let path = out_dir.join(&file.file_name);
        fs::write(&path, &file.source).with_context(|| format!("write {}", path.display()))?;
        tracing::info!(path = %path.display(), template = file.kind.file_name(), "wrote fragment");
        println!("{}", path.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = Config::from_env().context("read configuration")?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.out_dir.clone());

    match args.command {
        Command::Disable { method, paths } => {
            let paths = paths
                .iter()
                .map(|p| parse_target(p))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let rendered = render_disable(&paths, method).context("render disable fragments")?;
            write_outputs(&out_dir, &rendered)
        }
        Command::Spoof {
            device_id,
            model,
            rx6x50,
            path,
        } => {
            let request = SpoofRequest {
                path: parse_target(&path)?,
                device_id,
                model,
                kind: if rx6x50 {
                    SpoofKind::Rx6x50
                } else {
                    SpoofKind::Generic
                },
            };
            let rendered = render_spoof(&request).context("render spoof fragment")?;
            write_outputs(&out_dir, &[rendered])
        }
        Command::Convert { location } => {
            let converted = convert(&location)
                .with_context(|| format!("convert location path {location:?}"))?;
            println!("{converted}");
            Ok(())
        }
        Command::Simulate {
            manifest,
            teardown,
            path,
        } => {
            let raw = fs::read_to_string(&manifest)
                .with_context(|| format!("read manifest {}", manifest.display()))?;
            let parsed: simulate::Manifest = serde_json::from_str(&raw)
                .with_context(|| format!("parse manifest {}", manifest.display()))?;
            let target = parse_target(&path)?;
            let trace = simulate::run(&parsed, &config.osi, &target, teardown)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&trace).context("serialize trace")?
            );
            Ok(())
        }
    }
}
