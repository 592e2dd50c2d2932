use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const USER_NAME_MAX_LEN: usize = 50;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AuthorMarker;

/// Stored shape of an author. `user_name` is unique across all authors.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Id<AuthorMarker>,
    pub first_name: String,
    pub last_name: String,
    pub user_name: UserName,
}

impl Author {
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Derives the public display name from the stored name parts. Invoked at
/// serialization time; the result is never stored.
#[must_use]
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_owned()
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthor {
    pub first_name: String,
    pub last_name: String,
    pub user_name: UserName,
}

/// Partial update. `id`, when present, must match the path id.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthor {
    pub id: Option<Id<AuthorMarker>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<UserName>,
}

/// Public listing shape with the derived display name.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Id<AuthorMarker>,
    pub name: String,
    pub user_name: UserName,
}

impl From<Author> for AuthorSummary {
    fn from(author: Author) -> Self {
        let name = author.full_name();
        Self {
            id: author.id,
            name,
            user_name: author.user_name,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The user name is invalid: {0}")]
pub struct InvalidUserNameError(String);

impl UserName {
    pub fn new(user_name: String) -> Result<Self, InvalidUserNameError> {
        if !user_name.is_empty() && user_name.chars().count() <= USER_NAME_MAX_LEN {
            Ok(UserName(user_name))
        } else {
            Err(InvalidUserNameError(user_name))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for UserName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<'de> Deserialize<'de> for UserName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        UserName::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"UserName"))
    }
}
