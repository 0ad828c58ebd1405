use crate::domain::utils::id::{ClusterId, InstanceTypeId};

#[derive(Debug)]
pub enum EngineEndpoint<'a> {
    Root,
    Cluster(&'a ClusterId),
    ClusterNetworks(&'a ClusterId),
    ClusterAffinityGroups(&'a ClusterId),
    VnicProfiles,
    Hosts,
    InstanceType(&'a InstanceTypeId),
}

impl EngineEndpoint<'_> {
    pub fn path(&self) -> String {
        match self {
            Self::Root => String::new(),
            Self::Cluster(id) => format!("/clusters/{}", id),
            Self::ClusterNetworks(id) => format!("/clusters/{}/networks", id),
            Self::ClusterAffinityGroups(id) => format!("/clusters/{}/affinitygroups", id),
            Self::VnicProfiles => "/vnicprofiles".to_string(),
            Self::Hosts => "/hosts".to_string(),
            Self::InstanceType(id) => format!("/instancetypes/{}", id),
        }
    }
}
