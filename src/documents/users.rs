//! Author lookup for history display

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::versioning::UserId;

/// Display data for an acting user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Resolves user ids to display profiles.
///
/// Unknown users are not an error; history entries simply carry no author.
pub trait UserDirectory: Send + Sync {
    fn lookup(&self, id: UserId) -> Option<UserProfile>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    pub fn insert(&self, profile: UserProfile) {
        if let Ok(mut users) = self.users.write() {
            users.insert(profile.id, profile);
        }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn lookup(&self, id: UserId) -> Option<UserProfile> {
        self.users.read().ok()?.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        let known = UserProfile {
            id: UserId::new(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        let directory = InMemoryUserDirectory::with_users([known.clone()]);

        assert_eq!(directory.lookup(known.id), Some(known));
        assert_eq!(directory.lookup(UserId::new()), None);
    }
}
