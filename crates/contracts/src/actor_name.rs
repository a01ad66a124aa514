//! Actor names and envelope recipients

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Reserved recipient value that fans an envelope out to every mailbox.
pub const BROADCAST: &str = "broadcast";

/// Name an actor registers its mailbox under
///
/// Station actors use the station name from the blueprint; the
/// collaborators use the constants in [`crate::names`]. Every envelope
/// carries its sender's name, so the string is shared rather than copied.
///
/// Equality, ordering and hashing are those of the underlying `str`, which
/// lets a `HashMap<ActorName, _>` be queried with a plain `&str`.
///
/// ```
/// use contracts::ActorName;
///
/// let name: ActorName = "Palatupana".into();
/// assert_eq!(name, "Palatupana");
/// assert_eq!(name.clone().as_str(), "Palatupana");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorName(Arc<str>);

impl ActorName {
    pub fn new(s: &str) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ActorName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ActorName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ActorName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorName {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for ActorName {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&String> for ActorName {
    fn from(s: &String) -> Self {
        Self(s.as_str().into())
    }
}

impl PartialEq<str> for ActorName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for ActorName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for ActorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ActorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Plain string on the wire
impl Serialize for ActorName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ActorName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Envelope destination: one named mailbox or every registered mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    Broadcast,
    Actor(ActorName),
}

impl Recipient {
    /// Parse a wire-level recipient, honouring the reserved broadcast value.
    pub fn parse(s: &str) -> Self {
        if s == BROADCAST {
            Self::Broadcast
        } else {
            Self::Actor(ActorName::new(s))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Broadcast => BROADCAST,
            Self::Actor(name) => name.as_str(),
        }
    }

    pub fn is_broadcast(&self) -> bool {
        matches!(self, Self::Broadcast)
    }
}

impl From<ActorName> for Recipient {
    fn from(name: ActorName) -> Self {
        Self::Actor(name)
    }
}

impl From<&ActorName> for Recipient {
    fn from(name: &ActorName) -> Self {
        Self::Actor(name.clone())
    }
}

impl From<&str> for Recipient {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Recipient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Recipient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_hashmap_lookup_by_str() {
        let mut map: HashMap<ActorName, u32> = HashMap::new();
        map.insert("Galge".into(), 6);
        assert_eq!(map.get("Galge"), Some(&6));
    }

    #[test]
    fn test_names_order_like_strings() {
        let mut names: Vec<ActorName> = vec!["Yala_HQ".into(), "Buttawa".into(), "Galge".into()];
        names.sort();
        assert_eq!(names, vec!["Buttawa", "Galge", "Yala_HQ"]);
        assert_eq!(format!("{:?}", names[0]), "\"Buttawa\"");
    }

    #[test]
    fn test_recipient_reserved_broadcast() {
        assert!(Recipient::parse("broadcast").is_broadcast());
        assert_eq!(
            Recipient::parse("Buttawa"),
            Recipient::Actor(ActorName::new("Buttawa"))
        );
    }

    #[test]
    fn test_recipient_serde_as_plain_string() {
        let json = serde_json::to_string(&Recipient::Broadcast).unwrap();
        assert_eq!(json, "\"broadcast\"");
        let back: Recipient = serde_json::from_str("\"Yala_HQ\"").unwrap();
        assert_eq!(back.as_str(), "Yala_HQ");
    }
}
