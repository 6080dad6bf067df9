pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    consumers::{
        consumer_list_response::ConsumerListResponse,
        consumer_response::ConsumerResponse,
        consumers::{
            get_consumer, list_consumers, start_consumer, stop_consumer, update_concurrency,
        },
        start_consumer_request::StartConsumerRequest,
        stop_consumer_response::StopConsumerResponse,
        update_concurrency_request::UpdateConcurrencyRequest,
    },
    error::ApiError,
    error::Result as ApiResult,
    extractors::tenant_id::TenantId,
    messages::{
        list_messages_query::ListMessagesQuery,
        messages::{list_messages, publish_message},
        publish_response::PublishResponse,
    },
    tenants::{
        deprovision_response::DeprovisionResponse,
        tenant_status_response::TenantStatusResponse,
        tenants::{deprovision_tenant, get_tenant_status},
    },
};
pub use app_state::AppState;
pub use error::{Result as ServerErrorResult, ServerError};

pub use crate::routes::build_router;
