use crate::api::install_config_dto::{InstallConfig, OvirtPlatform};

/// Network the cluster VMs attach to when none is configured.
pub const DEFAULT_NETWORK_NAME: &str = "ovirtmgmt";

/// Fills unset optional fields of the platform block in place.
///
/// An explicitly empty affinity group name list is kept as is.
pub fn set_platform_defaults(platform: &mut OvirtPlatform, ic: &InstallConfig) {
    if platform.ovirt_network_name.is_empty() {
        platform.ovirt_network_name = DEFAULT_NETWORK_NAME.to_string();
    }
    if platform.affinity_groups_names.is_none() {
        platform.affinity_groups_names = Some(vec![ic.cluster_name().to_string()]);
    }
}

/// Applies [`set_platform_defaults`] to the config's own platform block, if any.
pub fn set_install_config_defaults(ic: &mut InstallConfig) {
    let Some(mut platform) = ic.platform.ovirt.take() else {
        return;
    };
    set_platform_defaults(&mut platform, ic);
    ic.platform.ovirt = Some(platform);
}
