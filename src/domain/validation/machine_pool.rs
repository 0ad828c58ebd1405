use crate::api::install_config_dto::OvirtMachinePool;
use crate::domain::engine::engine_api::EngineApi;
use crate::domain::field_error::{ErrorList, FieldError, FieldPath};
use crate::domain::utils::id::InstanceTypeId;

pub fn validate_machine_pool(con: &dyn EngineApi, fld_path: &FieldPath, pool: &OvirtMachinePool, all_errs: &mut ErrorList) {
    validate_instance_type_id(con, fld_path, pool, all_errs);
}

fn validate_instance_type_id(con: &dyn EngineApi, fld_path: &FieldPath, pool: &OvirtMachinePool, all_errs: &mut ErrorList) {
    if pool.instance_type_id.is_empty() {
        return;
    }
    if let Err(e) = con.instance_type(&InstanceTypeId::new(&pool.instance_type_id)) {
        log::debug!("Instance type {} could not be resolved: {}", pool.instance_type_id, e);
        all_errs.push(FieldError::not_found(fld_path.child("instanceTypeID"), &pool.instance_type_id));
    }
}
