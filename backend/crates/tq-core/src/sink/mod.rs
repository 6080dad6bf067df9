pub mod in_memory;
pub mod message_sink;
