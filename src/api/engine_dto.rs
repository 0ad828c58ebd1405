use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::utils::id::{ClusterId, HostId, InstanceTypeId, NetworkId, VnicProfileId};

/// Reference to another Engine object, e.g. `"network": { "id": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDto<I> {
    pub id: I,
}

/// Response object for `GET /clusters/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterDto {
    pub id: ClusterId,
    pub name: String,

    /// Remaining attributes the Engine returns for a cluster.
    #[serde(flatten)]
    pub extra_fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDto {
    pub id: NetworkId,
    pub name: String,
}

/// Root response object for `GET /clusters/{id}/networks`.
///
/// The Engine omits the list entirely when it is empty.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NetworksDto {
    #[serde(default)]
    pub network: Vec<NetworkDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VnicProfileDto {
    pub id: VnicProfileId,
    #[serde(default)]
    pub name: String,
    pub network: Option<LinkDto<NetworkId>>,
}

/// Root response object for `GET /vnicprofiles`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VnicProfilesDto {
    #[serde(default)]
    pub vnic_profile: Vec<VnicProfileDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityGroupDto {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Priority and enforcement flags come back as strings; they are kept as raw JSON.
    #[serde(flatten)]
    pub extra_fields: HashMap<String, serde_json::Value>,
}

/// Root response object for `GET /clusters/{id}/affinitygroups`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AffinityGroupsDto {
    #[serde(default)]
    pub affinity_group: Vec<AffinityGroupDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDto {
    pub id: HostId,
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Root response object for `GET /hosts?search=cluster=<name>`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HostsDto {
    #[serde(default)]
    pub host: Vec<HostDto>,
}

/// Response object for `GET /instancetypes/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceTypeDto {
    pub id: InstanceTypeId,
    pub name: String,

    #[serde(flatten)]
    pub extra_fields: HashMap<String, serde_json::Value>,
}

/// Response of the SSO password grant.
#[derive(Debug, Deserialize)]
pub struct SsoTokenDto {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
