//! Transducer Electronic Data Sheet snapshots.
//!
//! TEDS-capable sensors carry a small self-description memory; the host
//! exposes it per input channel as an ordered list of `(name, value)`
//! string pairs.  A channel without a TEDS sensor, or with an unreadable
//! one, reports a per-channel error; a sweep over all channels always
//! yields one record per channel.

use serde::Serialize;

/// One `(name, value)` property of a transducer data sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TedsProperty {
    pub name: String,
    pub value: String,
}

impl TedsProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// TEDS snapshot for one input channel.
///
/// `channel` is 1-based, matching the host's display convention.  When
/// the host could not read the channel's sheet, `properties` is empty and
/// `error` carries the host-reported cause.
#[derive(Debug, Clone, Serialize)]
pub struct TedsRecord {
    pub channel: u32,
    pub properties: Vec<TedsProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TedsRecord {
    /// Record for a readable channel.  Pairs with an empty name and value
    /// are trailing allocation slack from the host array and are dropped.
    pub fn from_pairs(channel_number: u32, pairs: Vec<(String, String)>) -> Self {
        let properties = pairs
            .into_iter()
            .filter(|(name, value)| !name.is_empty() && !value.is_empty())
            .map(|(name, value)| TedsProperty { name, value })
            .collect();
        Self {
            channel: channel_number,
            properties,
            error: None,
        }
    }

    /// Record for a channel whose sheet could not be read.
    pub fn from_error(channel_number: u32, message: impl Into<String>) -> Self {
        Self {
            channel: channel_number,
            properties: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Value of a named property, if present.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_drops_trailing_blanks() {
        let rec = TedsRecord::from_pairs(
            1,
            vec![
                ("Manufacturer".into(), "Dytran Instruments".into()),
                ("Model number".into(), "3055".into()),
                (String::new(), String::new()),
                (String::new(), String::new()),
            ],
        );
        assert_eq!(rec.channel, 1);
        assert_eq!(rec.properties.len(), 2);
        assert_eq!(rec.property("Model number"), Some("3055"));
        assert!(rec.error.is_none());
    }

    #[test]
    fn test_error_record_serialization() {
        let rec = TedsRecord::from_error(3, "no TEDS hardware on channel");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"channel\":3"));
        assert!(json.contains("no TEDS hardware"));

        let ok = TedsRecord::from_pairs(1, vec![("a".into(), "b".into())]);
        let json = serde_json::to_string(&ok).unwrap();
        assert!(!json.contains("error"));
    }
}
