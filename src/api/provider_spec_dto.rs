use serde::{Deserialize, Serialize};

/// Machine provider spec of one oVirt machine pool, as generated for the cluster API provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OvirtMachineProviderSpec {
    #[serde(default, rename = "instance_type_id")]
    pub instance_type_id: String,
    #[serde(default, rename = "type")]
    pub vm_type: String,
    #[serde(default, rename = "memory_mb")]
    pub memory_mb: i32,
    #[serde(default, rename = "os_disk")]
    pub os_disk: Option<DiskDto>,
    #[serde(default)]
    pub cpu: Option<CpuDto>,
    #[serde(default)]
    pub affinity_groups_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiskDto {
    #[serde(default)]
    pub size_gb: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CpuDto {
    #[serde(default)]
    pub sockets: i32,
    #[serde(default)]
    pub cores: i32,
    #[serde(default)]
    pub threads: i32,
}
