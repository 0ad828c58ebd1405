use crate::api::install_config_dto::OvirtPlatform;
use crate::domain::engine::engine_api::EngineApi;
use crate::domain::field_error::{ErrorList, FieldError, FieldPath};
use crate::domain::utils::id::ClusterId;

/// Checks that the configured VNIC profile belongs to the configured cluster network.
pub fn validate_vnic_profile(platform: &OvirtPlatform, con: &dyn EngineApi, fld_path: &FieldPath, all_errs: &mut ErrorList) {
    if platform.vnic_profile_id.is_empty() {
        return;
    }

    let detail = match con.vnic_profiles_by_cluster_network(&ClusterId::new(&platform.ovirt_cluster_id), &platform.ovirt_network_name) {
        Ok(profiles) if profiles.iter().any(|p| p.id.as_str() == platform.vnic_profile_id) => return,
        Ok(_) => format!(
            "vNic profile ID {} does not belong to cluster network {}",
            platform.vnic_profile_id, platform.ovirt_network_name
        ),
        Err(e) => e.to_string(),
    };

    all_errs.push(FieldError::invalid(fld_path.clone(), &platform.vnic_profile_id, detail));
}
