//! Relationship model: who sent a message and where to send replies.
//!
//! [`Sender`] is resolved from the wire contact scene plus the sender
//! envelope. [`Contact`] is the outbound routing target and is the inverse of
//! that resolution: it is built from a [`Friend`] or a [`Group`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Scene
// ============================================================================

/// Conversation context of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    Group,
    Friend,
    Guild,
    Nearby,
    Stranger,
    StrangerFromGroup,
}

impl Scene {
    /// Returns the wire value of this scene.
    pub fn code(self) -> i32 {
        match self {
            Self::Group => 0,
            Self::Friend => 1,
            Self::Guild => 2,
            Self::Nearby => 5,
            Self::Stranger => 9,
            Self::StrangerFromGroup => 10,
        }
    }

    /// Returns the scene for a wire value, if it is known.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Group),
            1 => Some(Self::Friend),
            2 => Some(Self::Guild),
            5 => Some(Self::Nearby),
            9 => Some(Self::Stranger),
            10 => Some(Self::StrangerFromGroup),
            _ => None,
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Group => "group",
            Self::Friend => "friend",
            Self::Guild => "guild",
            Self::Nearby => "nearby",
            Self::Stranger => "stranger",
            Self::StrangerFromGroup => "stranger_from_group",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Relationship Types
// ============================================================================

/// Permission level of a group member. Ordered from least to most privileged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MemberPerm {
    #[default]
    Member = 1,
    Administrator = 2,
    Owner = 3,
}

/// A friend of the bot account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Friend {
    pub id: u64,
    pub nickname: String,
    pub remark: String,
}

/// A user with no friend relationship to the bot account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stranger {
    pub id: u64,
    pub nickname: String,
    pub remark: String,
}

/// Another client logged in to the same account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Client {
    pub id: u64,
    pub platform: String,
}

/// A group the bot account belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    /// Permission level of the bot account in this group.
    pub account_perm: MemberPerm,
}

impl Group {
    /// Creates a group shell that only knows its id.
    ///
    /// The remaining fields stay empty until a collaborator fetches them.
    pub fn shell(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// A member of a [`Group`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    /// Display name inside the group.
    pub member_name: String,
    pub permission: MemberPerm,
    pub special_title: String,
    pub join_timestamp: u64,
    pub last_speak_timestamp: u64,
    /// Remaining mute time in seconds.
    pub mute_time_remaining: u64,
    pub group: Group,
}

// ============================================================================
// Sender
// ============================================================================

/// The originator of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sender {
    Friend(Friend),
    Member(Member),
    Stranger(Stranger),
    Client(Client),
}

impl Sender {
    /// Returns the sender's user id.
    pub fn id(&self) -> u64 {
        match self {
            Self::Friend(friend) => friend.id,
            Self::Member(member) => member.id,
            Self::Stranger(stranger) => stranger.id,
            Self::Client(client) => client.id,
        }
    }

    /// Returns the best display name for the sender.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Friend(friend) => &friend.nickname,
            Self::Member(member) => &member.member_name,
            Self::Stranger(stranger) => &stranger.nickname,
            Self::Client(client) => &client.platform,
        }
    }

    /// Returns the routing target a reply to this sender should use.
    ///
    /// Members reply into their group. Clients have no reply target.
    pub fn reply_contact(&self) -> Option<Contact> {
        match self {
            Self::Friend(friend) => Some(to_contact(friend)),
            Self::Member(member) => Some(to_contact(&member.group)),
            Self::Stranger(stranger) => Some(Contact::new(Scene::Stranger, stranger.id)),
            Self::Client(_) => None,
        }
    }
}

// ============================================================================
// Contact
// ============================================================================

/// Outbound routing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contact {
    pub scene: Scene,
    pub peer: u64,
}

impl Contact {
    pub fn new(scene: Scene, peer: u64) -> Self {
        Self { scene, peer }
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scene, self.peer)
    }
}

impl From<&Friend> for Contact {
    fn from(friend: &Friend) -> Self {
        Self::new(Scene::Friend, friend.id)
    }
}

impl From<&Group> for Contact {
    fn from(group: &Group) -> Self {
        Self::new(Scene::Group, group.id)
    }
}

/// Builds the routing target for a friend or a group.
pub fn to_contact<T>(target: &T) -> Contact
where
    for<'a> &'a T: Into<Contact>,
{
    target.into()
}
