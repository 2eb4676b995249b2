use std::borrow::{Borrow, Cow};
use std::fmt;

/// Identifier of a status definition, e.g. `"chi"` or `"burn"`.
///
/// Compares and hashes like the underlying string, so maps keyed by
/// `StatusId` can be queried with a plain `&str`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StatusId(Cow<'static, str>);

impl StatusId {
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StatusId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatusId {
    fn from(id: &str) -> Self {
        Self(Cow::Owned(id.to_owned()))
    }
}

impl From<String> for StatusId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a reusable status behavior.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BehaviorId(Cow<'static, str>);

impl BehaviorId {
    pub const BONUS_POOL: Self = Self::from_static("bonus-pool");
    pub const PRE_DEFENSE_REACTION: Self = Self::from_static("pre-defense-reaction");
    pub const DAMAGE_OVER_TIME: Self = Self::from_static("damage-over-time");

    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for BehaviorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BehaviorId {
    fn from(id: &str) -> Self {
        Self(Cow::Owned(id.to_owned()))
    }
}

impl fmt::Display for BehaviorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a status helps or hurts its holder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// Whether a status is spent on demand or works on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum ActivationMode {
    /// Consumed through a spend rule.
    Active,
    /// Ticks or modifies combat math without being spent.
    Passive,
}
