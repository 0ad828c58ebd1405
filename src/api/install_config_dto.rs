use serde::{Deserialize, Serialize};

/// The subset of `install-config.yaml` the oVirt platform reads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallConfig {
    #[serde(default)]
    pub metadata: ObjectMetaDto,
    #[serde(default)]
    pub platform: PlatformDto,
    pub control_plane: Option<MachinePool>,
    #[serde(default)]
    pub compute: Vec<MachinePool>,
}

impl InstallConfig {
    pub fn cluster_name(&self) -> &str {
        &self.metadata.name
    }

    pub fn ovirt(&self) -> Option<&OvirtPlatform> {
        self.platform.ovirt.as_ref()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectMetaDto {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlatformDto {
    pub ovirt: Option<OvirtPlatform>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OvirtPlatform {
    #[serde(default)]
    pub ovirt_cluster_id: String,
    #[serde(default)]
    pub ovirt_storage_domain_id: String,
    #[serde(default)]
    pub ovirt_network_name: String,
    #[serde(default, rename = "vnicProfileID")]
    pub vnic_profile_id: String,
    #[serde(default, rename = "affinityGroups")]
    pub affinity_groups: Vec<AffinityGroup>,

    /// `None` when never set; `Some(vec![])` is an explicit opt-out.
    #[serde(default, rename = "affinityGroupsNames", skip_serializing_if = "Option::is_none")]
    pub affinity_groups_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AffinityGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enforcing: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MachinePool {
    #[serde(default)]
    pub name: String,
    pub replicas: Option<i64>,
    #[serde(default)]
    pub platform: MachinePoolPlatform,
}

impl MachinePool {
    pub fn ovirt(&self) -> Option<&OvirtMachinePool> {
        self.platform.ovirt.as_ref()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MachinePoolPlatform {
    pub ovirt: Option<OvirtMachinePool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OvirtMachinePool {
    #[serde(default, rename = "instanceTypeID")]
    pub instance_type_id: String,
    #[serde(default, rename = "affinityGroupsNames", skip_serializing_if = "Option::is_none")]
    pub affinity_groups_names: Option<Vec<String>>,
}

impl OvirtMachinePool {
    pub fn affinity_groups_names(&self) -> &[String] {
        self.affinity_groups_names.as_deref().unwrap_or_default()
    }
}
