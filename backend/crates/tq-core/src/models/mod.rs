pub mod consumer_status;
pub mod message_page;
pub mod stored_message;
