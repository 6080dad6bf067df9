pub mod deprovision_response;
pub mod tenant_status_response;
#[allow(clippy::module_inception)]
pub mod tenants;
