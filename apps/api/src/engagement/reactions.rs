use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn opposite(self) -> Reaction {
        match self {
            Reaction::Like => Reaction::Dislike,
            Reaction::Dislike => Reaction::Like,
        }
    }

    /// Column names of the membership set and its counter.
    pub fn columns(self) -> (&'static str, &'static str) {
        match self {
            Reaction::Like => ("liked_by", "like_count"),
            Reaction::Dislike => ("disliked_by", "dislike_count"),
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reaction::Like => f.write_str("like"),
            Reaction::Dislike => f.write_str("dislike"),
        }
    }
}

/// Whether switching one reaction on clears the opposite one for the same user.
///
/// `Independent` keeps the two sets unaware of each other, so a user may appear
/// in both. `Exclusive` removes the user from the opposite set (and decrements
/// its counter) when a reaction is turned on. Turning a reaction off never
/// touches the opposite set under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReactionPolicy {
    #[default]
    Independent,
    Exclusive,
}

impl FromStr for ReactionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(ReactionPolicy::Independent),
            "exclusive" => Ok(ReactionPolicy::Exclusive),
            other => Err(format!(
                "unknown reaction policy '{other}' (expected 'independent' or 'exclusive')"
            )),
        }
    }
}

/// Reaction membership sets with their denormalized counters.
///
/// Embedded (flattened) into every engagement document. The counters are
/// maintained alongside the sets by [`Reactions::toggle`] and are never
/// recomputed from the set sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reactions {
    pub liked_by: Vec<String>,
    pub like_count: i32,
    pub disliked_by: Vec<String>,
    pub dislike_count: i32,
}

impl Reactions {
    pub fn members(&self, reaction: Reaction) -> &[String] {
        match reaction {
            Reaction::Like => &self.liked_by,
            Reaction::Dislike => &self.disliked_by,
        }
    }

    pub fn has(&self, reaction: Reaction, user_id: &str) -> bool {
        self.members(reaction).iter().any(|u| u == user_id)
    }

    fn parts_mut(&mut self, reaction: Reaction) -> (&mut Vec<String>, &mut i32) {
        match reaction {
            Reaction::Like => (&mut self.liked_by, &mut self.like_count),
            Reaction::Dislike => (&mut self.disliked_by, &mut self.dislike_count),
        }
    }

    /// Flips `user_id`'s membership in the `reaction` set and adjusts its counter.
    /// Returns `true` when the reaction is active afterwards.
    pub fn toggle(&mut self, reaction: Reaction, user_id: &str, policy: ReactionPolicy) -> bool {
        let (set, count) = self.parts_mut(reaction);
        if let Some(pos) = set.iter().position(|u| u == user_id) {
            set.remove(pos);
            *count -= 1;
            return false;
        }
        set.push(user_id.to_string());
        *count += 1;

        if policy == ReactionPolicy::Exclusive {
            let (other, other_count) = self.parts_mut(reaction.opposite());
            if let Some(pos) = other.iter().position(|u| u == user_id) {
                other.remove(pos);
                *other_count -= 1;
            }
        }
        true
    }

    /// True when both counters match their set sizes.
    pub fn is_consistent(&self) -> bool {
        self.like_count as usize == self.liked_by.len()
            && self.dislike_count as usize == self.disliked_by.len()
    }
}
