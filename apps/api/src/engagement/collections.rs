use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engagement::reactions::Reaction;

/// Community content kinds that accumulate reactions and comment threads.
/// The serialized form is the `{domain}` path segment and the stored `domain` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Interview,
    Referral,
    Resume,
    Salary,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Interview,
        Domain::Referral,
        Domain::Resume,
        Domain::Salary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Interview => "interview",
            Domain::Referral => "referral",
            Domain::Resume => "resume",
            Domain::Salary => "salary",
        }
    }

    /// Human-readable name used in error messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Domain::Interview => "Interview experience",
            Domain::Referral => "Referral",
            Domain::Resume => "Resume template",
            Domain::Salary => "Salary entry",
        }
    }

    /// Interview experiences only carry likes; the rest are bipolar.
    pub fn supports_dislike(&self) -> bool {
        !matches!(self, Domain::Interview)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown domain '{s}'"))
    }
}

/// A reactable collection: either the domain documents themselves or the
/// comment thread attached to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Targets(Domain),
    Comments(Domain),
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Targets(_) => "engagement_targets",
            Collection::Comments(_) => "comments",
        }
    }

    pub fn supports(&self, reaction: Reaction) -> bool {
        match (self, reaction) {
            (_, Reaction::Like) => true,
            (Collection::Targets(d), Reaction::Dislike) => d.supports_dislike(),
            (Collection::Comments(_), Reaction::Dislike) => false,
        }
    }

    /// Comment threads are moderated: admins may delete any comment.
    pub fn admin_can_delete(&self) -> bool {
        matches!(self, Collection::Comments(_))
    }

    pub fn noun(&self) -> &'static str {
        match self {
            Collection::Targets(d) => d.noun(),
            Collection::Comments(_) => "Comment",
        }
    }
}
