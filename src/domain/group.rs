use super::user::UserId;
use crate::error::{Result, SplitError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A set of members sharing expenses.
///
/// Nobody owns a group once it exists: every member can read it and add
/// expenses to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub created_by: UserId,
    /// Member ids in join order; the creator comes first.
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>, created_by: UserId) -> Result<Self> {
        let name = name.into();
        if id.as_str().trim().is_empty() || id.as_str().chars().any(char::is_control) {
            return Err(SplitError::ValidationError(format!(
                "Invalid group id {:?}",
                id.as_str()
            )));
        }
        if name.trim().is_empty() {
            return Err(SplitError::ValidationError(
                "Group name is required".to_string(),
            ));
        }
        Ok(Self {
            id,
            name,
            members: vec![created_by.clone()],
            created_by,
            created_at: Utc::now(),
        })
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Adds a member, rejecting users already in the group.
    pub fn join(&mut self, user: UserId) -> Result<()> {
        if self.is_member(&user) {
            return Err(SplitError::AlreadyMember {
                user,
                group: self.id.clone(),
            });
        }
        self.members.push(user);
        Ok(())
    }

    /// Fails with `NotAGroupMember` unless `user` belongs to the group.
    pub fn ensure_member(&self, user: &UserId) -> Result<()> {
        if self.is_member(user) {
            Ok(())
        } else {
            Err(SplitError::NotAGroupMember {
                user: user.clone(),
                group: self.id.clone(),
            })
        }
    }
}

/// A group member resolved to the name other members see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: UserId,
    pub name: String,
}

/// A group's id together with its resolved members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub group: GroupId,
    pub members: Vec<Member>,
}

impl Roster {
    pub fn new(group: GroupId, members: Vec<Member>) -> Self {
        Self { group, members }
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.members.iter().any(|m| &m.user_id == user)
    }

    pub fn ensure_member(&self, user: &UserId) -> Result<()> {
        if self.contains(user) {
            Ok(())
        } else {
            Err(SplitError::NotAGroupMember {
                user: user.clone(),
                group: self.group.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creator_is_first_member() {
        let group = Group::new("trip".into(), "Trip", "alice".into()).unwrap();
        assert_eq!(group.members, vec![UserId::from("alice")]);
        assert!(group.is_member(&"alice".into()));
    }

    #[test]
    fn test_group_name_required() {
        assert!(matches!(
            Group::new("trip".into(), "  ", "alice".into()),
            Err(SplitError::ValidationError(_))
        ));
    }

    #[test]
    fn test_group_id_must_be_printable() {
        for id in ["", "   ", "g\0x", "trip\n"] {
            assert!(
                matches!(
                    Group::new(id.into(), "Trip", "alice".into()),
                    Err(SplitError::ValidationError(_))
                ),
                "{id:?} should be rejected"
            );
        }
        assert!(Group::new("weekend-trip 2024".into(), "Trip", "alice".into()).is_ok());
    }

    #[test]
    fn test_join_rejects_existing_member() {
        let mut group = Group::new("trip".into(), "Trip", "alice".into()).unwrap();
        group.join("bob".into()).unwrap();
        assert_eq!(group.members.len(), 2);

        assert!(matches!(
            group.join("bob".into()),
            Err(SplitError::AlreadyMember { .. })
        ));
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn test_ensure_member() {
        let group = Group::new("trip".into(), "Trip", "alice".into()).unwrap();
        assert!(group.ensure_member(&"alice".into()).is_ok());
        assert!(matches!(
            group.ensure_member(&"mallory".into()),
            Err(SplitError::NotAGroupMember { .. })
        ));
    }
}
