//! Events and event rules.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::PropertyType;

/// Kind of analytics call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Named track event.
    Track,
    /// User identification.
    Identify,
    /// Web page view.
    Page,
    /// Mobile screen view.
    Screen,
    /// Group association.
    Group,
}

impl EventType {
    /// Get the call name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Identify => "identify",
            Self::Page => "page",
            Self::Screen => "screen",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Part of the call a rule describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSection {
    /// Event properties.
    #[serde(rename = "properties")]
    Properties,
    /// User or group traits.
    #[serde(rename = "traits")]
    Traits,
    /// Traits carried in the call context.
    #[serde(rename = "context.traits")]
    ContextTraits,
}

impl EventSection {
    /// Get the section name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Traits => "traits",
            Self::ContextTraits => "context.traits",
        }
    }

    /// Whether this section may appear on a rule for `event_type`.
    pub fn is_valid_for(&self, event_type: EventType) -> bool {
        match event_type {
            EventType::Track | EventType::Screen | EventType::Page => {
                *self == Self::Properties
            }
            EventType::Identify | EventType::Group => {
                matches!(self, Self::Traits | Self::ContextTraits)
            }
        }
    }

    /// Name of the wrapper parameter carrying the payload.
    pub fn param_name(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Traits | Self::ContextTraits => "traits",
        }
    }

    fn type_words(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Traits => "traits",
            Self::ContextTraits => "context traits",
        }
    }
}

impl fmt::Display for EventSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An analytics event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Call kind.
    pub event_type: EventType,
    /// Event name, only meaningful for track events.
    pub name: SmolStr,
    /// Documentation.
    pub description: Option<String>,
}

/// Shape of a rule's properties or traits.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No properties and no additional properties. Nothing to pass.
    Empty,
    /// Only additional properties. Callers pass an untyped object.
    Open,
    /// A generated record or object variant.
    Typed(PropertyType),
}

/// Which properties or traits apply to one call.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRule {
    /// The event the rule applies to.
    pub event: Event,
    /// Section the payload fills.
    pub section: EventSection,
    /// Payload shape.
    pub payload: Payload,
}

impl EventRule {
    /// Semantic name of the payload type, e.g. `Track User Signed Up properties`.
    pub fn payload_type_name(&self) -> String {
        let word = self.section.type_words();
        match self.event.event_type {
            EventType::Track => format!("Track {} {}", self.event.name, word),
            other => format!("{} {}", other.as_str(), word),
        }
    }

    /// Whether the section/event combination is one the wrapper can emit.
    pub fn is_valid(&self) -> bool {
        self.section.is_valid_for(self.event.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(event_type: EventType, name: &str, section: EventSection) -> EventRule {
        EventRule {
            event: Event {
                event_type,
                name: name.into(),
                description: None,
            },
            section,
            payload: Payload::Empty,
        }
    }

    #[test]
    fn test_section_validity() {
        assert!(EventSection::Properties.is_valid_for(EventType::Track));
        assert!(!EventSection::Traits.is_valid_for(EventType::Track));
        assert!(EventSection::ContextTraits.is_valid_for(EventType::Identify));
        assert!(EventSection::Traits.is_valid_for(EventType::Group));
        assert!(!EventSection::Properties.is_valid_for(EventType::Group));
        assert!(EventSection::Properties.is_valid_for(EventType::Page));
    }

    #[test]
    fn test_payload_type_names() {
        assert_eq!(
            rule(EventType::Track, "User Signed Up", EventSection::Properties).payload_type_name(),
            "Track User Signed Up properties"
        );
        assert_eq!(
            rule(EventType::Identify, "", EventSection::Traits).payload_type_name(),
            "identify traits"
        );
        assert_eq!(
            rule(EventType::Group, "", EventSection::ContextTraits).payload_type_name(),
            "group context traits"
        );
    }

    #[test]
    fn test_section_serde_names() {
        let section: EventSection = serde_json::from_str("\"context.traits\"").unwrap();
        assert_eq!(section, EventSection::ContextTraits);
        let event_type: EventType = serde_json::from_str("\"screen\"").unwrap();
        assert_eq!(event_type, EventType::Screen);
    }
}
