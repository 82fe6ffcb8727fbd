use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! newtype_string {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance from a string value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the inner string as a str slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    MeetingId,
    "A short, URL-safe meeting identifier issued by the document store."
);
newtype_string!(
    BlobName,
    "The name under which an uploaded file's bytes live in the blob area."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_from_str() {
        let id = MeetingId::from("a1b2c3d4");
        assert_eq!(id.as_str(), "a1b2c3d4");
        assert_eq!(&*id, "a1b2c3d4");
    }

    #[test]
    fn newtype_serde_roundtrip() {
        let name = BlobName::new("9f8e7d6c5b4a");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"9f8e7d6c5b4a\"");
        let back: BlobName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn newtype_display() {
        let id = MeetingId::new("deadbeef");
        assert_eq!(format!("{id}"), "deadbeef");
    }
}
