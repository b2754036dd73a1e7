pub mod app_state;
pub mod handlers;
pub mod preview;
pub mod router;
