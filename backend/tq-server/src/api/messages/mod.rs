pub mod list_messages_query;
#[allow(clippy::module_inception)]
pub mod messages;
pub mod publish_response;
