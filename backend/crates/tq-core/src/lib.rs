pub mod error;
pub mod models;
pub mod sink;

pub use error::{CoreError, Result as CoreResult};
pub use models::consumer_status::ConsumerStatus;
pub use models::message_page::MessagePage;
pub use models::stored_message::StoredMessage;
pub use sink::in_memory::InMemorySink;
pub use sink::message_sink::MessageSink;

pub use error_location::ErrorLocation;

/// Name of the broker queue that carries a tenant's messages.
pub fn queue_name(tenant_id: &str) -> String {
    format!("tenant_{tenant_id}_queue")
}

#[cfg(test)]
mod tests;
