pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

pub use error::BookingError;
pub use router::webhook_routes;
pub use services::{InMemorySessionStore, MessageRouter, SessionStore};
pub use state::WebhookState;
