//! Up/down vote state machine shared by comment votes and article votes.
//!
//! A (user, target) pair is in one of three states: no vote, upvoted or
//! downvoted. Submitting the status the pair already holds removes the
//! vote; submitting the opposite status flips it in place.
//!
//! ```text
//! current    incoming   result
//! none       true       Up      (create)
//! none       false      Down    (create)
//! Up         true       none    (delete)
//! Up         false      Down    (update)
//! Down       false      none    (delete)
//! Down       true       Up      (update)
//! ```

use serde::{Deserialize, Deserializer};

/// The write a vote submission requires against the vote table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No row existed; insert one with this status.
    Create(bool),
    /// A row with a different status existed; overwrite it.
    Update(bool),
    /// A row with the same status existed; remove it.
    Delete,
}

impl VoteTransition {
    /// Decide the transition from the currently stored status (if any).
    pub fn resolve(current: Option<bool>, incoming: bool) -> Self {
        match current {
            None => VoteTransition::Create(incoming),
            Some(status) if status == incoming => VoteTransition::Delete,
            Some(_) => VoteTransition::Update(incoming),
        }
    }

    /// The status the pair holds after the transition is applied.
    pub fn resulting_status(self) -> Option<bool> {
        match self {
            VoteTransition::Create(status) | VoteTransition::Update(status) => Some(status),
            VoteTransition::Delete => None,
        }
    }

    /// Whether the transition inserted a fresh row (HTTP 201 vs 200).
    pub fn is_created(self) -> bool {
        matches!(self, VoteTransition::Create(_))
    }

    /// Human-readable outcome for the given vote target.
    pub fn message(self, target: VoteTarget) -> String {
        match (self.resulting_status(), target) {
            (Some(true), VoteTarget::Comment) => "You upvote this comment".to_string(),
            (Some(false), VoteTarget::Comment) => "You downvote this comment".to_string(),
            (None, VoteTarget::Comment) => "You have unvoted this comment".to_string(),
            (Some(true), VoteTarget::Article) => "You like this article".to_string(),
            (Some(false), VoteTarget::Article) => "You dislike this article".to_string(),
            (None, VoteTarget::Article) => "You have unvoted this article".to_string(),
        }
    }
}

/// What is being voted on; only affects response wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Comment,
    Article,
}

/// Current up/down totals for a vote target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// Vote status as submitted by clients.
///
/// Clients send the status as a stringified boolean (`"true"` / `"false"`);
/// plain JSON booleans are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteStatus(pub bool);

impl VoteStatus {
    /// Parse the stringified form. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "true" => Some(VoteStatus(true)),
            "false" => Some(VoteStatus(false)),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for VoteStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(VoteStatus(b)),
            Raw::Text(s) => VoteStatus::parse(&s)
                .ok_or_else(|| serde::de::Error::custom("status must be true or false")),
        }
    }
}
