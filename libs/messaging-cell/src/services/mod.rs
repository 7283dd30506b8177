pub mod gateway;
pub mod stats;
pub mod whatsapp;

pub use gateway::MessagingGateway;
pub use stats::DeliveryStats;
pub use whatsapp::WhatsAppClient;
