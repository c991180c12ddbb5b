pub mod auth_requests;
pub mod link_requests;
pub mod token_requests;
