use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attribute::Attribute;
use crate::errors::ClientError;
use crate::ids::EventType;

/// Which execution backend the engine should run a rule on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    #[default]
    Cpu,
    Gpu,
}

/// A rule definition headed for the engine, past the parser seam,
/// together with the id its derived event type registers under.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleSubmission {
    pub rule_text: String,
    pub assigned_id: EventType,
    pub engine: EngineType,
}

/// Interest registration for one event type. No payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub event_type: EventType,
}

/// An outbound event. Carries no timestamp: events are stamped by the
/// server when they enter the engine, never by the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub event_type: EventType,
    pub attributes: Vec<Attribute>,
}

impl Publication {
    /// Build a publication from parallel key/value slices, inferring a
    /// type for each value in input order. A length mismatch or a
    /// duplicate attribute name rejects the whole request before any
    /// packet exists.
    pub fn from_pairs<K, V>(
        event_type: EventType,
        keys: &[K],
        values: &[V],
    ) -> Result<Self, ClientError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if keys.len() != values.len() {
            return Err(ClientError::Argument(format!(
                "key/value length mismatch: {} keys, {} values",
                keys.len(),
                values.len()
            )));
        }
        let mut attributes: Vec<Attribute> = Vec::with_capacity(keys.len());
        for (key, raw) in keys.iter().zip(values) {
            let name = key.as_ref();
            if attributes.iter().any(|a| a.name == name) {
                return Err(ClientError::Argument(format!(
                    "duplicate attribute name: {name}"
                )));
            }
            attributes.push(Attribute::inferred(name, raw.as_ref()));
        }
        Ok(Self {
            event_type,
            attributes,
        })
    }
}

/// An inbound event matching one of the session's subscriptions. The
/// timestamp is server-assigned epoch milliseconds, always present.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub event_type: EventType,
    pub attributes: Vec<Attribute>,
    pub timestamp: i64,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.event_type)?;
        for attr in &self.attributes {
            write!(f, " {attr}")?;
        }
        match chrono::DateTime::from_timestamp_millis(self.timestamp) {
            Some(ts) => write!(
                f,
                "}}@{}",
                ts.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
            ),
            None => write!(f, "}}@{}", self.timestamp),
        }
    }
}

/// Every packet the protocol knows. Three outbound shapes, one inbound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Packet {
    RuleSubmission(RuleSubmission),
    Subscription(Subscription),
    Publication(Publication),
    Notification(Notification),
}

impl Packet {
    /// The event-type id this packet is about.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::RuleSubmission(p) => p.assigned_id,
            Self::Subscription(p) => p.event_type,
            Self::Publication(p) => p.event_type,
            Self::Notification(p) => p.event_type,
        }
    }

    /// Wire tag, for logging.
    pub fn packet_type(&self) -> &'static str {
        match self {
            Self::RuleSubmission(_) => "rule_submission",
            Self::Subscription(_) => "subscription",
            Self::Publication(_) => "publication",
            Self::Notification(_) => "notification",
        }
    }
}
