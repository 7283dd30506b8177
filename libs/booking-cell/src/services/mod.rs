pub mod dispatcher;
pub mod flow;
pub mod machine;
pub mod outbox;
pub mod prompts;
pub mod render;
pub mod session_store;
pub mod slots;

pub use dispatcher::MessageRouter;
pub use flow::BookingFlowService;
pub use outbox::Outbox;
pub use session_store::{spawn_session_sweeper, InMemorySessionStore, SessionStore};
pub use slots::generate_slots;
