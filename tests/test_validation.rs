use ovirt_platform::api::install_config_dto::{
    AffinityGroup, InstallConfig, MachinePool, MachinePoolPlatform, ObjectMetaDto, OvirtMachinePool, OvirtPlatform, PlatformDto,
};
use ovirt_platform::domain::engine::engine_mock::{MockConnector, MockEngineData};
use ovirt_platform::domain::field_error::{ErrorList, ErrorType};
use ovirt_platform::domain::validation::validate;
use ovirt_platform::error::{Error, Result};

const CLUSTER_ID: &str = "3ca3d0c0-5ec4-11eb-ae93-0242ac130002";
const STORAGE_DOMAIN_ID: &str = "4dc8d4a6-5ec4-11eb-ae93-0242ac130002";
const NETWORK_ID: &str = "9b1c2d2e-5ec4-11eb-ae93-0242ac130002";
const VNIC_PROFILE_ID: &str = "0000000a-000a-000a-000a-000000000398";

fn group(name: &str, priority: i64, enforcing: bool) -> AffinityGroup {
    AffinityGroup { name: name.to_string(), priority, description: String::new(), enforcing }
}

fn pool(name: &str, replicas: i64, instance_type_id: &str, groups: &[&str]) -> MachinePool {
    MachinePool {
        name: name.to_string(),
        replicas: Some(replicas),
        platform: MachinePoolPlatform {
            ovirt: Some(OvirtMachinePool {
                instance_type_id: instance_type_id.to_string(),
                affinity_groups_names: Some(groups.iter().map(|g| g.to_string()).collect()),
            }),
        },
    }
}

fn install_config(groups: Vec<AffinityGroup>) -> InstallConfig {
    InstallConfig {
        metadata: ObjectMetaDto { name: "ocp".to_string() },
        platform: PlatformDto {
            ovirt: Some(OvirtPlatform {
                ovirt_cluster_id: CLUSTER_ID.to_string(),
                ovirt_storage_domain_id: STORAGE_DOMAIN_ID.to_string(),
                ovirt_network_name: "ovirtmgmt".to_string(),
                vnic_profile_id: VNIC_PROFILE_ID.to_string(),
                affinity_groups: groups,
                affinity_groups_names: Some(vec!["ocp".to_string()]),
            }),
        },
        control_plane: Some(pool("master", 3, "", &["controlplane"])),
        compute: vec![pool("worker", 2, "", &["compute"])],
    }
}

fn engine() -> MockEngineData {
    MockEngineData::new(CLUSTER_ID, "Default")
        .with_network(NETWORK_ID, "ovirtmgmt")
        .with_vnic_profile(VNIC_PROFILE_ID, NETWORK_ID)
        .with_instance_type("small")
        .with_hosts(3)
}

fn validation_errors(result: Result<()>) -> ErrorList {
    match result {
        Err(Error::Validation(errs)) => errs,
        other => panic!("Expected validation errors, got {:?}", other),
    }
}

#[test]
fn test_valid_config() {
    let connector = MockConnector::new(engine());
    let ic = install_config(vec![group("controlplane", 5, true), group("compute", 3, true)]);

    let result = validate(&ic, &connector);
    assert!(result.is_ok(), "{:?}", result);

    let probe = connector.probe();
    assert_eq!(probe.connects(), 1);
    assert_eq!(probe.closes(), 1);
}

#[test]
fn test_missing_platform_is_required_and_offline() {
    let connector = MockConnector::new(engine());
    let ic = InstallConfig { metadata: ObjectMetaDto { name: "ocp".to_string() }, ..Default::default() };

    let errs = validation_errors(validate(&ic, &connector));
    assert_eq!(errs.len(), 1);
    assert_eq!(errs.count_of(ErrorType::Required), 1);
    assert_eq!(errs.to_string(), "platform.ovirt: Required value: validation requires a Engine platform configuration");

    let probe = connector.probe();
    assert_eq!(probe.connects(), 0);
    assert_eq!(probe.requests(), 0);
}

#[test]
fn test_unreachable_engine_is_fatal() {
    let connector = MockConnector::unreachable();
    let ic = install_config(vec![]);

    let err = validate(&ic, &connector).unwrap_err();
    assert!(matches!(err, Error::Connection(_)), "{:?}", err);
}

#[test]
fn test_connection_released_when_errors_are_found() {
    let connector = MockConnector::new(engine().with_affinity_group("compute"));
    let ic = install_config(vec![group("compute", 9, true)]);

    let errs = validation_errors(validate(&ic, &connector));
    assert!(errs.len() >= 2);
    assert_eq!(connector.probe().closes(), 1);
}

#[test]
fn test_vnic_profile_on_other_network() {
    let data = engine().with_network("net-2", "storage").with_vnic_profile("storage-profile", "net-2");
    let connector = MockConnector::new(data);
    let mut ic = install_config(vec![]);
    ic.platform.ovirt.as_mut().unwrap().vnic_profile_id = "5f1d1c2e-5ec4-11eb-ae93-0242ac130002".to_string();

    let errs = validation_errors(validate(&ic, &connector));
    assert_eq!(errs.len(), 1);
    let err = errs.iter().next().unwrap();
    assert_eq!(err.field.to_string(), "platform.ovirt.vnicProfileID");
    assert!(err.detail.contains("does not belong to cluster network ovirtmgmt"));
}

#[test]
fn test_unknown_instance_types() {
    let connector = MockConnector::new(engine());
    let mut ic = install_config(vec![]);
    ic.control_plane = Some(pool("master", 3, "small", &[]));
    ic.compute = vec![pool("worker", 2, "small", &[]), pool("infra", 2, "huge", &[])];

    let errs = validation_errors(validate(&ic, &connector));
    assert_eq!(errs.count_of(ErrorType::NotFound), 1);
    assert_eq!(errs.iter().next().unwrap().field.to_string(), "compute[1].platform.ovirt.instanceTypeID");
}

#[test]
fn test_conflicting_duplicates() {
    let connector = MockConnector::new(engine());
    let ic = install_config(vec![group("compute", 1, true), group("compute", 2, true)]);

    let errs = validation_errors(validate(&ic, &connector));
    assert!(errs.count_of(ErrorType::Duplicate) >= 1);
}

#[test]
fn test_enforcing_capacity_shortfall() {
    let connector = MockConnector::new(engine());
    let mut ic = install_config(vec![group("compute", 1, true)]);
    ic.compute = vec![pool("worker", 2, "", &["compute"]), pool("infra", 2, "", &["compute"])];

    let errs = validation_errors(validate(&ic, &connector));
    assert_eq!(errs.len(), 1);
    assert!(errs.to_string().contains("found 3 hosts but 4 replicas"));
}

#[test]
fn test_soft_capacity_shortfall_passes() {
    let connector = MockConnector::new(engine());
    let mut ic = install_config(vec![group("compute", 1, false)]);
    ic.compute = vec![pool("worker", 2, "", &["compute"]), pool("infra", 2, "", &["compute"])];

    assert!(validate(&ic, &connector).is_ok());
}

#[test]
fn test_remote_failures_do_not_stop_other_checks() {
    let mut data = engine();
    data.fail_affinity_groups = true;
    data.fail_cluster = true;
    let connector = MockConnector::new(data);
    let ic = install_config(vec![group("", 1, true)]);

    let errs = validation_errors(validate(&ic, &connector));
    assert_eq!(errs.count_of(ErrorType::Internal), 2);
    assert_eq!(errs.count_of(ErrorType::Invalid), 1);
    assert_eq!(connector.probe().closes(), 1);
}
