pub mod api_handlers;
pub mod auth_handlers;
pub mod health_handlers;
pub mod link_handlers;
pub mod resolve_handlers;
pub mod token_handlers;
