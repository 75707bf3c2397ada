//! Account-side entities: organizations, consumer sites, users and roles.
//!
//! These are the anchors playlists hang off. They carry little data of their
//! own here; the store manages them so that deleting an anchor can cascade
//! into its dependent playlists.

use serde::{Deserialize, Serialize};

use super::base::EntityMeta;

/// Role granted to a user on a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Instructor,
    Student,
}

impl Role {
    /// Returns the lowercase token used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Instructor => "instructor",
            Role::Student => "student",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Instructor
    }
}

/// An organization owning playlists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub meta: EntityMeta,
    pub name: String,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
        }
    }
}

/// An LTI consumer site through which playlists are reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerSite {
    pub meta: EntityMeta,
    pub name: String,
    pub domain: String,
}

impl ConsumerSite {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            name: name.into(),
            domain: domain.into(),
        }
    }
}

/// A platform user, referenced as creator and access grantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub meta: EntityMeta,
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            meta: EntityMeta::new(),
            username: username.into(),
        }
    }
}
