//! Notification routing.
//!
//! Turns each check's [`FindingSet`](crate::findings::FindingSet) into a
//! broadcast, optional direct messages to the offending principals, and
//! fallback notices for principals missing from the chat user map.

pub mod mapping;
pub mod message;
pub mod router;

pub use mapping::{ChatHandle, MappingError, PrincipalChatMap};
pub use message::BotIdentity;
pub use router::{CheckRoute, Delivery, Destination, DispatchReport, OutboundMessage, Router};
