pub mod affinity_group;
pub mod machine_pool;
pub mod platform;
pub mod vnic_profile;

use crate::api::install_config_dto::InstallConfig;
use crate::domain::engine::engine_api::EngineConnector;
use crate::domain::field_error::{ErrorList, FieldError, FieldPath};
use crate::error::Result;

use affinity_group::validate_affinity_groups;
use machine_pool::validate_machine_pool;
use platform::validate_platform;
use vnic_profile::validate_vnic_profile;

/// Runs every oVirt-specific check of `ic` against the Engine reached through `connector`.
///
/// All field errors are collected and returned together as [`crate::error::Error::Validation`].
/// A missing platform block or a connector failure is returned right away.
pub fn validate(ic: &InstallConfig, connector: &dyn EngineConnector) -> Result<()> {
    let mut all_errs = ErrorList::new();
    let ovirt_platform_path = FieldPath::new(&["platform", "ovirt"]);

    let Some(platform) = ic.ovirt() else {
        all_errs.push(FieldError::required(ovirt_platform_path, "validation requires a Engine platform configuration"));
        return all_errs.into_result();
    };

    validate_platform(platform, &ovirt_platform_path, &mut all_errs);

    let con = connector.connect()?;
    log::info!("Validating oVirt platform configuration against cluster {}", platform.ovirt_cluster_id);

    validate_vnic_profile(platform, con.as_ref(), &ovirt_platform_path.child("vnicProfileID"), &mut all_errs);

    if let Some(pool) = ic.control_plane.as_ref().and_then(|cp| cp.ovirt()) {
        validate_machine_pool(con.as_ref(), &FieldPath::new(&["controlPlane", "platform", "ovirt"]), pool, &mut all_errs);
    }
    for (idx, compute) in ic.compute.iter().enumerate() {
        if let Some(pool) = compute.ovirt() {
            let fld_path = FieldPath::new(&["compute"]).index(idx).child("platform").child("ovirt");
            validate_machine_pool(con.as_ref(), &fld_path, pool, &mut all_errs);
        }
    }

    validate_affinity_groups(ic, platform, &ovirt_platform_path.child("affinityGroups"), con.as_ref(), &mut all_errs);

    drop(con);

    if all_errs.is_empty() {
        log::info!("oVirt platform configuration is valid");
    } else {
        log::error!("oVirt platform validation found {} error(s)", all_errs.len());
    }
    all_errs.into_result()
}
