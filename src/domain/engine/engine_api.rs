use std::fmt::Debug;

use crate::api::engine_dto::{AffinityGroupDto, HostDto, InstanceTypeDto, NetworkDto, VnicProfileDto};
use crate::domain::utils::id::{ClusterId, InstanceTypeId};
use crate::error::{Error, Result};

/// Read-only view of the Engine used while validating an install config.
///
/// Implementations own the underlying connection; dropping the value releases it.
pub trait EngineApi: Debug {
    // GET /
    fn test(&self) -> Result<()>;

    // GET /clusters/{id}
    fn cluster_name(&self, cluster_id: &ClusterId) -> Result<String>;

    // GET /clusters/{id}/networks
    fn cluster_networks(&self, cluster_id: &ClusterId) -> Result<Vec<NetworkDto>>;

    // GET /vnicprofiles
    fn vnic_profiles(&self) -> Result<Vec<VnicProfileDto>>;

    // GET /clusters/{id}/affinitygroups
    fn affinity_groups(&self, cluster_id: &ClusterId) -> Result<Vec<AffinityGroupDto>>;

    // GET /hosts?search=cluster={name}
    fn hosts_in_cluster(&self, cluster_name: &str) -> Result<Vec<HostDto>>;

    // GET /instancetypes/{id}
    fn instance_type(&self, instance_type_id: &InstanceTypeId) -> Result<InstanceTypeDto>;

    /// Profiles attached to the network called `network_name` in the given cluster.
    fn vnic_profiles_by_cluster_network(&self, cluster_id: &ClusterId, network_name: &str) -> Result<Vec<VnicProfileDto>> {
        let network = self
            .cluster_networks(cluster_id)?
            .into_iter()
            .find(|network| network.name == network_name)
            .ok_or_else(|| Error::Engine(format!("network {} not found in cluster {}", network_name, cluster_id)))?;

        let profiles = self
            .vnic_profiles()?
            .into_iter()
            .filter(|profile| profile.network.as_ref().is_some_and(|link| link.id == network.id))
            .collect();

        Ok(profiles)
    }
}

/// Opens connections to the Engine.
pub trait EngineConnector {
    fn connect(&self) -> Result<Box<dyn EngineApi>>;
}
