pub mod tenant_id;
