mod tenant_id;
