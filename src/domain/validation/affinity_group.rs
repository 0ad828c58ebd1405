//! Affinity group checks.
//!
//! - every group has a name and a priority between 0 and 5
//! - no group already exists in the Engine cluster
//! - groups sharing a name are defined identically
//! - the cluster has enough hosts for the replicas placed in each group

use std::collections::HashMap;

use crate::api::install_config_dto::{AffinityGroup, InstallConfig, MachinePool, OvirtPlatform};
use crate::domain::engine::engine_api::EngineApi;
use crate::domain::field_error::{ErrorList, FieldError, FieldPath};
use crate::domain::utils::id::ClusterId;

const MIN_PRIORITY: i64 = 0;
const MAX_PRIORITY: i64 = 5;

pub fn validate_affinity_groups(ic: &InstallConfig, platform: &OvirtPlatform, fld_path: &FieldPath, con: &dyn EngineApi, all_errs: &mut ErrorList) {
    validate_affinity_group_fields(platform, fld_path, all_errs);
    validate_existing_affinity_group(con, platform, fld_path, all_errs);
    validate_affinity_group_duplicate(&platform.affinity_groups, fld_path, all_errs);
    validate_cluster_resources(con, ic, platform, fld_path, all_errs);
}

pub fn validate_affinity_group_fields(platform: &OvirtPlatform, fld_path: &FieldPath, all_errs: &mut ErrorList) {
    for ag in &platform.affinity_groups {
        if ag.name.is_empty() {
            all_errs.push(FieldError::invalid(
                fld_path.clone(),
                ag,
                format!("Invalid affinity group {}: name must be not empty", ag.name),
            ));
        }
        if ag.priority < MIN_PRIORITY || ag.priority > MAX_PRIORITY {
            all_errs.push(FieldError::invalid(
                fld_path.clone(),
                ag,
                format!(
                    "Invalid affinity group {}: priority value must be between {}-{} found priority {}",
                    ag.name, MIN_PRIORITY, MAX_PRIORITY, ag.priority
                ),
            ));
        }
    }
}

/// An affinity group that already exists in the cluster cannot be redefined.
pub fn validate_existing_affinity_group(con: &dyn EngineApi, platform: &OvirtPlatform, fld_path: &FieldPath, all_errs: &mut ErrorList) {
    let existing = match con.affinity_groups(&ClusterId::new(&platform.ovirt_cluster_id)) {
        Ok(groups) => groups,
        Err(e) => {
            log::debug!("Listing affinity groups failed: {}", e);
            all_errs.push(FieldError::internal(
                fld_path.clone(),
                format!("failed listing affinity groups for cluster {}", platform.ovirt_cluster_id),
            ));
            return;
        }
    };

    for ag in &existing {
        for ag_new in platform.affinity_groups.iter().filter(|ag_new| ag_new.name == ag.name) {
            all_errs.push(FieldError::invalid(
                fld_path.clone(),
                ag_new,
                format!("affinity group {} already exist in cluster {}", ag_new.name, platform.ovirt_cluster_id),
            ));
        }
    }
}

/// Groups sharing a name must agree on every other field.
pub fn validate_affinity_group_duplicate(ag_list: &[AffinityGroup], fld_path: &FieldPath, all_errs: &mut ErrorList) {
    for (i, ag1) in ag_list.iter().enumerate() {
        for ag2 in &ag_list[i + 1..] {
            if ag1.name == ag2.name && ag1 != ag2 {
                all_errs.push(FieldError::duplicate(
                    fld_path.clone(),
                    &(ag1, ag2),
                    format!("found same affinity group {} defined twice with different fields", ag1.name),
                ));
            }
        }
    }
}

/// Replicas per affinity group name, summed over the control plane and every compute pool.
pub fn replicas_per_affinity_group(ic: &InstallConfig) -> HashMap<&str, i64> {
    let mut ag_replicas: HashMap<&str, i64> = HashMap::new();
    let pools = ic.control_plane.iter().chain(ic.compute.iter());

    for pool in pools {
        let Some(ovirt) = pool.ovirt() else {
            continue;
        };
        for agn in ovirt.affinity_groups_names() {
            *ag_replicas.entry(agn.as_str()).or_insert(0) += replicas(pool);
        }
    }
    ag_replicas
}

fn replicas(pool: &MachinePool) -> i64 {
    pool.replicas.unwrap_or(0)
}

fn host_count(con: &dyn EngineApi, platform: &OvirtPlatform, fld_path: &FieldPath, all_errs: &mut ErrorList) -> Option<usize> {
    let cluster_name = match con.cluster_name(&ClusterId::new(&platform.ovirt_cluster_id)) {
        Ok(name) => name,
        Err(e) => {
            all_errs.push(FieldError::internal(fld_path.clone(), e));
            return None;
        }
    };
    match con.hosts_in_cluster(&cluster_name) {
        Ok(hosts) => Some(hosts.len()),
        Err(e) => {
            all_errs.push(FieldError::internal(fld_path.clone(), e));
            None
        }
    }
}

/// Enforcing groups need at least as many hosts as replicas assigned to them.
///
/// Shortfalls on non-enforcing groups are only logged.
pub fn validate_cluster_resources(con: &dyn EngineApi, ic: &InstallConfig, platform: &OvirtPlatform, fld_path: &FieldPath, all_errs: &mut ErrorList) {
    let ag_replicas = replicas_per_affinity_group(ic);

    let Some(hosts) = host_count(con, platform, fld_path, all_errs) else {
        return;
    };

    for ag in &platform.affinity_groups {
        let Some(&required) = ag_replicas.get(ag.name.as_str()) else {
            continue;
        };
        if (hosts as i64) >= required {
            continue;
        }

        let msg = format!(
            "Affinity Group {} cannot be fulfilled, oVirt cluster doesn't have enough hosts: found {} hosts but {} replicas assigned to affinity group",
            ag.name, hosts, required
        );
        if ag.enforcing {
            all_errs.push(FieldError::invalid(fld_path.clone(), ag, msg));
        } else {
            tracing::warn!("{}", msg);
        }
    }
}
