//! Terraform variables for the oVirt platform.

use std::collections::BTreeSet;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::api::provider_spec_dto::OvirtMachineProviderSpec;
use crate::domain::image_cache::ImageFetcher;
use crate::error::Result;

/// Credentials terraform uses to talk to the Engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(rename = "ovirt_url")]
    pub url: String,
    #[serde(rename = "ovirt_username")]
    pub username: String,
    #[serde(rename = "ovirt_password")]
    pub password: String,
    #[serde(rename = "ovirt_cafile", default, skip_serializing_if = "String::is_empty")]
    pub cafile: String,
}

#[derive(Debug, Default, Serialize)]
struct Config {
    #[serde(flatten)]
    auth: Auth,
    #[serde(rename = "ovirt_cluster_id")]
    cluster_id: String,
    #[serde(rename = "ovirt_storage_domain_id")]
    storage_domain_id: String,
    #[serde(rename = "ovirt_network_name", skip_serializing_if = "String::is_empty")]
    network_name: String,
    #[serde(rename = "ovirt_vnic_profile_id", skip_serializing_if = "String::is_empty")]
    vnic_profile_id: String,
    #[serde(rename = "ovirt_masters_affinity_groups_names", skip_serializing_if = "Vec::is_empty")]
    master_affinity_groups_names: Vec<String>,
    #[serde(rename = "ovirt_cluster_affinity_groups_names", skip_serializing_if = "Vec::is_empty")]
    cluster_affinity_groups_names: Vec<String>,
    #[serde(rename = "openstack_base_image_name", skip_serializing_if = "String::is_empty")]
    base_image_name: String,
    #[serde(rename = "openstack_base_image_local_file_path", skip_serializing_if = "String::is_empty")]
    base_image_local_file_path: String,
    #[serde(rename = "ovirt_master_instance_type_id")]
    master_instance_type_id: String,
    #[serde(rename = "ovirt_master_vm_type", skip_serializing_if = "String::is_empty")]
    master_vm_type: String,
    #[serde(rename = "ovirt_master_memory")]
    master_memory: i32,
    #[serde(rename = "ovirt_master_cores")]
    master_cores: i32,
    #[serde(rename = "ovirt_master_sockets")]
    master_sockets: i32,
    #[serde(rename = "ovirt_master_os_disk_gb")]
    master_os_disk_gb: i64,
}

/// Image name terraform uploads the base image as, and whether `base_image` is a URL to fetch.
///
/// A hierarchical URL (`https://...`, `file:///...`) or an absolute path yields `<infra_id>-rhcos`.
/// Anything else, including opaque references such as `rhcos:4.8`, names an image that already exists.
pub fn generate_image_name(base_image: &str, infra_id: &str) -> (String, bool) {
    if is_image_url(base_image) {
        (format!("{}-rhcos", infra_id), true)
    } else {
        (base_image.to_string(), false)
    }
}

fn is_image_url(base_image: &str) -> bool {
    base_image.starts_with('/') || Url::parse(base_image).is_ok_and(|url| !url.cannot_be_a_base())
}

/// Non-empty control plane affinity group names, in order.
pub fn master_affinity_groups_names(masters_affinity_groups: &[String]) -> Vec<String> {
    masters_affinity_groups.iter().filter(|name| !name.is_empty()).cloned().collect()
}

/// Affinity group names used by worker pools, minus those the control plane already creates.
pub fn cluster_affinity_groups_names(workers: &[OvirtMachineProviderSpec], masters_affinity_groups: &[String]) -> Vec<String> {
    let mut unique_names: BTreeSet<&str> = workers
        .iter()
        .flat_map(|pool| pool.affinity_groups_names.iter())
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .collect();

    for masters_name in masters_affinity_groups {
        unique_names.remove(masters_name.as_str());
    }

    unique_names.into_iter().map(str::to_string).collect()
}

/// Generates the oVirt terraform variables as indented JSON.
#[allow(clippy::too_many_arguments)]
pub fn build_tfvars(
    auth: Auth,
    cluster_id: &str,
    storage_domain_id: &str,
    network_name: &str,
    vnic_profile_id: &str,
    base_image: &str,
    infra_id: &str,
    master_spec: &OvirtMachineProviderSpec,
    workers: &[OvirtMachineProviderSpec],
    image_fetcher: &dyn ImageFetcher,
) -> Result<Vec<u8>> {
    let mut cfg = Config {
        auth,
        cluster_id: cluster_id.to_string(),
        storage_domain_id: storage_domain_id.to_string(),
        network_name: network_name.to_string(),
        vnic_profile_id: vnic_profile_id.to_string(),
        master_instance_type_id: master_spec.instance_type_id.clone(),
        master_vm_type: master_spec.vm_type.clone(),
        master_os_disk_gb: master_spec.os_disk.as_ref().map(|disk| disk.size_gb).unwrap_or_default(),
        master_memory: master_spec.memory_mb,
        ..Default::default()
    };
    if let Some(cpu) = &master_spec.cpu {
        cfg.master_cores = cpu.cores;
        cfg.master_sockets = cpu.sockets;
    }

    let (image_name, is_url) = generate_image_name(base_image, infra_id);
    cfg.base_image_name = image_name;
    if is_url {
        let image_file_path = image_fetcher.fetch(base_image)?;
        cfg.base_image_local_file_path = image_file_path.to_string_lossy().into_owned();
    }

    cfg.master_affinity_groups_names = master_affinity_groups_names(&master_spec.affinity_groups_names);
    cfg.cluster_affinity_groups_names = cluster_affinity_groups_names(workers, &master_spec.affinity_groups_names);

    log::debug!(
        "Generated terraform variables for cluster {} (image {}, {} worker pool(s))",
        cfg.cluster_id,
        cfg.base_image_name,
        workers.len()
    );

    Ok(serde_json::to_vec_pretty(&cfg)?)
}
