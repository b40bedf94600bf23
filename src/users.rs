//! User profiles available to the dummy template context.
//!
//! Templates that greet or describe the logged-in user read `user` and
//! `user_profile` from the context. Those values come from a [`UserDirectory`];
//! [`FixtureUsers`] is the in-memory directory with the standard test accounts.

use serde::{Deserialize, Serialize};

use crate::core::TplcheckError;

/// The organization a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    pub string_id: String,
    pub name: String,
    pub uri: String,
}

/// A user account as seen by templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: String,
    pub short_name: String,
    pub is_staff: bool,
    pub realm: Realm,
}

/// Lookup of user profiles by email.
pub trait UserDirectory: Send + Sync {
    /// Fetch the profile for `email`. Matching is case-insensitive.
    fn get_user_profile_by_email(&self, email: &str) -> Result<UserProfile, TplcheckError>;
}

/// In-memory directory seeded with the standard test accounts.
#[derive(Debug, Clone)]
pub struct FixtureUsers {
    users: Vec<UserProfile>,
}

impl FixtureUsers {
    /// Directory with `hamlet`, `cordelia`, `iago` and `othello` in the `zulip` realm.
    pub fn new() -> Self {
        let realm = Realm {
            string_id: "zulip".to_string(),
            name: "Zulip Dev".to_string(),
            uri: "http://zulip.testserver".to_string(),
        };

        let users = [
            ("hamlet", "King Hamlet", false),
            ("cordelia", "Cordelia Lear", false),
            ("iago", "Iago", true),
            ("othello", "Othello, the Moor of Venice", false),
        ]
        .into_iter()
        .map(|(short_name, full_name, is_staff)| UserProfile {
            email: format!("{}@zulip.com", short_name),
            full_name: full_name.to_string(),
            short_name: short_name.to_string(),
            is_staff,
            realm: realm.clone(),
        })
        .collect();

        Self {
            users,
        }
    }

    /// Add or replace a profile, keyed by email.
    pub fn insert(&mut self, profile: UserProfile) {
        self.users.retain(|existing| !existing.email.eq_ignore_ascii_case(&profile.email));
        self.users.push(profile);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for FixtureUsers {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for FixtureUsers {
    fn get_user_profile_by_email(&self, email: &str) -> Result<UserProfile, TplcheckError> {
        let wanted = email.trim();
        self.users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| TplcheckError::UserNotFound {
                email: email.to_string(),
            })
    }
}
