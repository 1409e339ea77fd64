//! Asynchronous client session for a complex-event-processing engine.
//! Each session owns one TCP connection; callers drive the send path
//! while a background receive loop hands inbound notifications to
//! registered listeners.

mod listener;
mod rules;
mod session;
mod transport;

pub use listener::{ChannelListener, PacketListener};
pub use rules::{build_submission, ParsedRule, RawRuleParser, RuleParser};
pub use session::{Session, SessionState};
pub use transport::{connect, read_packet, write_packet, TransportError, MAX_FRAME_SIZE};
