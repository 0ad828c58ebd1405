use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use ovirt_platform::api::install_config_dto::InstallConfig;
use ovirt_platform::api::provider_spec_dto::OvirtMachineProviderSpec;
use ovirt_platform::domain::engine::credentials::check_credentials;
use ovirt_platform::domain::engine::engine_config::EngineConfig;
use ovirt_platform::domain::image_cache::ImageCache;
use ovirt_platform::domain::tfvars::{Auth, build_tfvars};
use ovirt_platform::domain::validation::validate;
use ovirt_platform::loader::parser::parse_json_file;
use ovirt_platform::{load_install_config, logger};

#[derive(Debug, Parser)]
#[command(name = "ovirt-platform", about = "Validate oVirt install configs and generate terraform variables")]
struct Cli {
    /// Engine connection config; defaults to $OVIRT_CONFIG or ~/.ovirt/ovirt-config.yaml
    #[arg(long, global = true)]
    engine_config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the oVirt platform section of an install config against the Engine
    Validate {
        #[arg(long)]
        install_config: String,
    },
    /// Generate terraform variables for the oVirt platform
    Tfvars {
        #[arg(long)]
        install_config: String,
        /// Infrastructure ID of the cluster
        #[arg(long)]
        infra_id: String,
        /// Base image name or URL
        #[arg(long)]
        base_image: String,
        /// JSON provider spec of the control plane pool
        #[arg(long)]
        master_spec: String,
        /// JSON provider spec of a compute pool, may be repeated
        #[arg(long)]
        worker_spec: Vec<String>,
        #[arg(long, default_value = "terraform.ovirt.auto.tfvars.json")]
        output: PathBuf,
        #[arg(long)]
        skip_validation: bool,
    },
    /// Check that a password authenticates against the Engine
    CheckCredentials {
        /// Password to try; the one from the Engine config is used when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

fn engine_config(path: Option<&str>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::load_default(),
    };
    config.context("failed to load Engine config")
}

fn run_tfvars(
    engine: &EngineConfig,
    install_config: &InstallConfig,
    infra_id: &str,
    base_image: &str,
    master_spec: &str,
    worker_specs: &[String],
    output: &Path,
) -> anyhow::Result<()> {
    let Some(platform) = install_config.ovirt() else {
        bail!("install config has no oVirt platform section");
    };

    let master: OvirtMachineProviderSpec = parse_json_file(master_spec).with_context(|| format!("failed to read {}", master_spec))?;
    let workers = worker_specs
        .iter()
        .map(|path| parse_json_file::<OvirtMachineProviderSpec>(path).with_context(|| format!("failed to read {}", path)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let auth = Auth {
        url: engine.ovirt_url.clone(),
        username: engine.ovirt_username.clone(),
        password: engine.ovirt_password.clone(),
        cafile: engine.ovirt_cafile.clone(),
    };
    let image_cache = ImageCache::default_location()?;

    let data = build_tfvars(
        auth,
        &platform.ovirt_cluster_id,
        &platform.ovirt_storage_domain_id,
        &platform.ovirt_network_name,
        &platform.vnic_profile_id,
        base_image,
        infra_id,
        &master,
        &workers,
        &image_cache,
    )?;

    fs::write(output, data).with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("Terraform variables written to '{}'", output.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init();

    match cli.command {
        Command::Validate { install_config } => {
            let ic = load_install_config(&install_config)?;
            let engine = engine_config(cli.engine_config.as_deref())?;
            validate(&ic, &engine)?;
        }
        Command::Tfvars { install_config, infra_id, base_image, master_spec, worker_spec, output, skip_validation } => {
            let ic = load_install_config(&install_config)?;
            let engine = engine_config(cli.engine_config.as_deref())?;
            if skip_validation {
                log::warn!("Skipping oVirt platform validation");
            } else {
                validate(&ic, &engine)?;
            }
            run_tfvars(&engine, &ic, &infra_id, &base_image, &master_spec, &worker_spec, &output)?;
        }
        Command::CheckCredentials { password } => {
            let engine = engine_config(cli.engine_config.as_deref())?;
            let password = password.unwrap_or_else(|| engine.ovirt_password.clone());
            check_credentials(&engine, &password)?;
            println!("Authenticated against {} as {}", engine.ovirt_url, engine.ovirt_username);
        }
    }
    Ok(())
}
