pub mod consumer_list_response;
pub mod consumer_response;
#[allow(clippy::module_inception)]
pub mod consumers;
pub mod start_consumer_request;
pub mod stop_consumer_response;
pub mod update_concurrency_request;
