//! Value objects.

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_ROOM_LEN: usize = 64;

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Identity of one viewer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerId(Uuid);

impl ViewerId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ViewerId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Upstream room identifier (the broadcaster's handle)
///
/// Accepts an optional leading '@' and surrounding whitespace, both stripped.
/// The remaining handle may only contain ASCII letters, digits, '_', '.' and '-'.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomTarget(String);

impl RoomTarget {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomTarget {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let handle = value.trim();
        let handle = handle.strip_prefix('@').unwrap_or(handle);

        if handle.is_empty() {
            return Err(ValueObjectError::EmptyRoom);
        }
        let len = handle.chars().count();
        if len > MAX_ROOM_LEN {
            return Err(ValueObjectError::RoomTooLong(len));
        }
        if !handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(ValueObjectError::InvalidRoom(handle.to_string()));
        }

        Ok(Self(handle.to_string()))
    }
}

impl TryFrom<&str> for RoomTarget {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.to_string())
    }
}

impl fmt::Display for RoomTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Upstream session credential (e.g. a platform session cookie)
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Credential {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Blank);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Viewer authorization token, checked by the `Authorizer`
///
/// May carry a password, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ViewerToken(String);

impl ViewerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ViewerToken {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::Blank);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Debug for ViewerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewerToken(***)")
    }
}
