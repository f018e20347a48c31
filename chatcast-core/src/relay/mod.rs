//! Relay core: the single-active-session coordinator and the event
//! translator that maps upstream events to outbound broadcast messages.

pub mod coordinator;
pub mod message;
pub mod translator;

pub use coordinator::SessionCoordinator;
pub use message::OutboundMessage;
