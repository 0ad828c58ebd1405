use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::engine_dto::{AffinityGroupDto, HostDto, InstanceTypeDto, LinkDto, NetworkDto, VnicProfileDto};
use crate::domain::engine::engine_api::{EngineApi, EngineConnector};
use crate::domain::utils::id::{ClusterId, HostId, InstanceTypeId, NetworkId, VnicProfileId};
use crate::error::{Error, Result};

/// Counters shared between a [`MockConnector`] and the connections it hands out.
#[derive(Debug, Default)]
pub struct MockEngineProbe {
    connects: AtomicUsize,
    closes: AtomicUsize,
    requests: AtomicUsize,
}

impl MockEngineProbe {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// In-memory Engine contents served by [`MockEngine`].
#[derive(Debug, Clone, Default)]
pub struct MockEngineData {
    pub cluster_id: String,
    pub cluster_name: String,
    pub networks: Vec<NetworkDto>,
    pub vnic_profiles: Vec<VnicProfileDto>,
    pub affinity_groups: Vec<AffinityGroupDto>,
    pub hosts: Vec<HostDto>,
    pub instance_types: Vec<InstanceTypeDto>,
    pub fail_affinity_groups: bool,
    pub fail_cluster: bool,
    pub fail_hosts: bool,
}

impl MockEngineData {
    pub fn new(cluster_id: &str, cluster_name: &str) -> Self {
        MockEngineData { cluster_id: cluster_id.to_string(), cluster_name: cluster_name.to_string(), ..Default::default() }
    }

    pub fn with_network(mut self, id: &str, name: &str) -> Self {
        self.networks.push(NetworkDto { id: NetworkId::new(id), name: name.to_string() });
        self
    }

    pub fn with_vnic_profile(mut self, id: &str, network_id: &str) -> Self {
        self.vnic_profiles.push(VnicProfileDto {
            id: VnicProfileId::new(id),
            name: id.to_string(),
            network: Some(LinkDto { id: NetworkId::new(network_id) }),
        });
        self
    }

    pub fn with_affinity_group(mut self, name: &str) -> Self {
        self.affinity_groups.push(AffinityGroupDto {
            id: format!("{}-id", name),
            name: name.to_string(),
            description: String::new(),
            extra_fields: HashMap::new(),
        });
        self
    }

    pub fn with_hosts(mut self, count: usize) -> Self {
        for i in 0..count {
            self.hosts.push(HostDto { id: HostId::new(format!("host-{}", i)), name: format!("host{}", i), status: "up".to_string() });
        }
        self
    }

    pub fn with_instance_type(mut self, id: &str) -> Self {
        self.instance_types.push(InstanceTypeDto { id: InstanceTypeId::new(id), name: id.to_string(), extra_fields: HashMap::new() });
        self
    }
}

/// Connection to a fake Engine; records its own release on drop.
#[derive(Debug)]
pub struct MockEngine {
    data: MockEngineData,
    probe: Arc<MockEngineProbe>,
}

impl MockEngine {
    fn request(&self) {
        self.probe.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn check_cluster(&self, cluster_id: &ClusterId) -> Result<()> {
        if cluster_id.as_str() == self.data.cluster_id {
            Ok(())
        } else {
            Err(Error::Engine(format!("cluster {} not found", cluster_id)))
        }
    }
}

impl EngineApi for MockEngine {
    fn test(&self) -> Result<()> {
        self.request();
        Ok(())
    }

    fn cluster_name(&self, cluster_id: &ClusterId) -> Result<String> {
        self.request();
        if self.data.fail_cluster {
            return Err(Error::Engine("cluster lookup failed".to_string()));
        }
        self.check_cluster(cluster_id)?;
        Ok(self.data.cluster_name.clone())
    }

    fn cluster_networks(&self, cluster_id: &ClusterId) -> Result<Vec<NetworkDto>> {
        self.request();
        self.check_cluster(cluster_id)?;
        Ok(self.data.networks.clone())
    }

    fn vnic_profiles(&self) -> Result<Vec<VnicProfileDto>> {
        self.request();
        Ok(self.data.vnic_profiles.clone())
    }

    fn affinity_groups(&self, cluster_id: &ClusterId) -> Result<Vec<AffinityGroupDto>> {
        self.request();
        if self.data.fail_affinity_groups {
            return Err(Error::Engine("affinity group listing failed".to_string()));
        }
        self.check_cluster(cluster_id)?;
        Ok(self.data.affinity_groups.clone())
    }

    fn hosts_in_cluster(&self, cluster_name: &str) -> Result<Vec<HostDto>> {
        self.request();
        if self.data.fail_hosts {
            return Err(Error::Engine("host search failed".to_string()));
        }
        if cluster_name == self.data.cluster_name { Ok(self.data.hosts.clone()) } else { Ok(Vec::new()) }
    }

    fn instance_type(&self, instance_type_id: &InstanceTypeId) -> Result<InstanceTypeDto> {
        self.request();
        self.data
            .instance_types
            .iter()
            .find(|it| &it.id == instance_type_id)
            .cloned()
            .ok_or_else(|| Error::Engine(format!("instance type {} not found", instance_type_id)))
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out [`MockEngine`] connections over a fixed data set.
#[derive(Debug, Clone)]
pub struct MockConnector {
    data: MockEngineData,
    fail_connect: bool,
    probe: Arc<MockEngineProbe>,
}

impl MockConnector {
    pub fn new(data: MockEngineData) -> Self {
        MockConnector { data, fail_connect: false, probe: Arc::new(MockEngineProbe::default()) }
    }

    pub fn unreachable() -> Self {
        MockConnector { data: MockEngineData::default(), fail_connect: true, probe: Arc::new(MockEngineProbe::default()) }
    }

    pub fn probe(&self) -> Arc<MockEngineProbe> {
        self.probe.clone()
    }
}

impl EngineConnector for MockConnector {
    fn connect(&self) -> Result<Box<dyn EngineApi>> {
        self.probe.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(Error::Connection("mock Engine is unreachable".to_string()));
        }
        Ok(Box::new(MockEngine { data: self.data.clone(), probe: self.probe.clone() }))
    }
}
