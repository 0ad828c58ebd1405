use uuid::Uuid;

use crate::api::install_config_dto::OvirtPlatform;
use crate::domain::field_error::{ErrorList, FieldError, FieldPath};

fn check_uuid(value: &str, fld_path: FieldPath, all_errs: &mut ErrorList) {
    if Uuid::parse_str(value).is_err() {
        all_errs.push(FieldError::invalid(fld_path, value, "invalid UUID"));
    }
}

/// Structural checks of the platform block that need no Engine access.
pub fn validate_platform(platform: &OvirtPlatform, fld_path: &FieldPath, all_errs: &mut ErrorList) {
    check_uuid(&platform.ovirt_cluster_id, fld_path.child("ovirt_cluster_id"), all_errs);
    check_uuid(&platform.ovirt_storage_domain_id, fld_path.child("ovirt_storage_domain_id"), all_errs);

    if platform.ovirt_network_name.is_empty() {
        all_errs.push(FieldError::required(fld_path.child("ovirt_network_name"), "network name must be set"));
    }
    if !platform.vnic_profile_id.is_empty() {
        check_uuid(&platform.vnic_profile_id, fld_path.child("vnicProfileID"), all_errs);
    }
}
