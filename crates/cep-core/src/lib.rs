//! Protocol data model for the CEP client: event-type ids, typed
//! attributes with string inference, the four packet shapes, and the
//! client-side error taxonomy. No I/O lives here.

mod attribute;
mod errors;
mod ids;
mod packet;

pub use attribute::{Attribute, AttributeValue};
pub use errors::{ClientError, ParseError};
pub use ids::EventType;
pub use packet::{
    EngineType, Notification, Packet, Publication, RuleSubmission, Subscription,
};
