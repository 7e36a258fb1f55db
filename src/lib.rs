pub mod bus;
pub mod chat;
pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod ids;
pub mod interface;
pub mod simulator;
pub mod store;

pub use chat::{Message, MessageKind};
pub use controller::{SessionConfig, SessionController, SessionState};
pub use error::Rejection;
