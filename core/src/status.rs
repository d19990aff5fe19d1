//! Per-operation status code tables.
//!
//! Each operation expects exactly one success code. Any other code is looked
//! up in that operation's table; codes the table does not list map to
//! [`ErrorKind::Unknown`].

use std::fmt;

use crate::error::{ApiError, ErrorKind};

use ErrorKind::*;

/// Every request the SDK can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateGroup,
    GetGroup,
    ListGroups,
    UpdateGroup,
    DeleteGroup,
    CreateThing,
    CreateThings,
    GetThing,
    ListThings,
    ListChannelThings,
    UpdateThing,
    DeleteThing,
    Connect,
    Disconnect,
}

const CREATE: &[(u16, ErrorKind)] = &[
    (400, MalformedJson),
    (401, Unauthorized),
    (409, AlreadyExists),
    (415, UnsupportedContentType),
    (422, Unprocessable),
    (500, ServerError),
];

const CREATE_GROUP: &[(u16, ErrorKind)] = &[
    (400, MalformedJson),
    (401, Unauthorized),
    (409, AlreadyExists),
    (415, UnsupportedContentType),
    (500, ServerError),
];

const GET_GROUP: &[(u16, ErrorKind)] = &[
    (400, MalformedJson),
    (401, Unauthorized),
    (422, Unprocessable),
    (500, ServerError),
];

const LIST_GROUPS: &[(u16, ErrorKind)] = &[
    (400, MalformedChannelId),
    (401, Unauthorized),
    (404, ChannelNotFound),
    (422, Unprocessable),
    (500, ServerError),
];

const UPDATE_GROUP: &[(u16, ErrorKind)] = &[
    (400, MalformedJson),
    (401, Unauthorized),
    (404, ChannelNotFound),
    (415, UnsupportedContentType),
    (500, ServerError),
];

const DELETE_GROUP: &[(u16, ErrorKind)] = &[
    (400, MalformedChannelId),
    (401, Unauthorized),
    (500, ServerError),
];

const GET_THINGS: &[(u16, ErrorKind)] = &[
    (401, Unauthorized),
    (404, ThingNotFound),
    (422, Unprocessable),
    (500, ServerError),
];

const LIST_CHANNEL_THINGS: &[(u16, ErrorKind)] = &[
    (400, MalformedJson),
    (401, Unauthorized),
    (409, AlreadyExists),
    (415, UnsupportedContentType),
    (500, ServerError),
];

const UPDATE_THING: &[(u16, ErrorKind)] = &[
    (400, MalformedJson),
    (401, Unauthorized),
    (404, ThingNotFound),
    (415, UnsupportedContentType),
    (500, ServerError),
];

const DELETE_THING: &[(u16, ErrorKind)] = &[
    (400, MalformedThingId),
    (401, Unauthorized),
    (500, ServerError),
];

const CONNECT: &[(u16, ErrorKind)] = &[
    (400, MalformedJson),
    (401, Unauthorized),
    (404, EntityNotFound),
    (409, AlreadyExists),
    (415, UnsupportedContentType),
    (500, ServerError),
];

const DISCONNECT: &[(u16, ErrorKind)] = &[
    (400, MalformedQuery),
    (401, Unauthorized),
    (404, ChannelOrThingNotFound),
    (500, ServerError),
];

impl Operation {
    pub const ALL: [Operation; 14] = [
        Operation::CreateGroup,
        Operation::GetGroup,
        Operation::ListGroups,
        Operation::UpdateGroup,
        Operation::DeleteGroup,
        Operation::CreateThing,
        Operation::CreateThings,
        Operation::GetThing,
        Operation::ListThings,
        Operation::ListChannelThings,
        Operation::UpdateThing,
        Operation::DeleteThing,
        Operation::Connect,
        Operation::Disconnect,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateGroup => "create group",
            Operation::GetGroup => "get group",
            Operation::ListGroups => "list groups",
            Operation::UpdateGroup => "update group",
            Operation::DeleteGroup => "delete group",
            Operation::CreateThing => "create thing",
            Operation::CreateThings => "create things",
            Operation::GetThing => "get thing",
            Operation::ListThings => "list things",
            Operation::ListChannelThings => "list channel things",
            Operation::UpdateThing => "update thing",
            Operation::DeleteThing => "delete thing",
            Operation::Connect => "connect",
            Operation::Disconnect => "disconnect",
        }
    }

    /// The single status code that counts as success.
    pub fn expected_status(self) -> u16 {
        match self {
            Operation::CreateGroup
            | Operation::CreateThing
            | Operation::CreateThings
            | Operation::ListChannelThings
            | Operation::Connect => 201,
            Operation::GetGroup
            | Operation::ListGroups
            | Operation::UpdateGroup
            | Operation::GetThing
            | Operation::ListThings
            | Operation::UpdateThing => 200,
            Operation::DeleteGroup | Operation::DeleteThing | Operation::Disconnect => 204,
        }
    }

    pub fn error_table(self) -> &'static [(u16, ErrorKind)] {
        match self {
            Operation::CreateGroup => CREATE_GROUP,
            Operation::GetGroup => GET_GROUP,
            Operation::ListGroups => LIST_GROUPS,
            Operation::UpdateGroup => UPDATE_GROUP,
            Operation::DeleteGroup => DELETE_GROUP,
            Operation::CreateThing | Operation::CreateThings => CREATE,
            Operation::GetThing | Operation::ListThings => GET_THINGS,
            Operation::ListChannelThings => LIST_CHANNEL_THINGS,
            Operation::UpdateThing => UPDATE_THING,
            Operation::DeleteThing => DELETE_THING,
            Operation::Connect => CONNECT,
            Operation::Disconnect => DISCONNECT,
        }
    }

    pub fn classify(self, status: u16) -> ErrorKind {
        self.error_table()
            .iter()
            .find(|(code, _)| *code == status)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::Unknown)
    }

    /// `Ok` on the expected code, a classified `ApiError::Status` otherwise.
    pub fn check(self, status: u16) -> Result<(), ApiError> {
        if status == self.expected_status() {
            return Ok(());
        }
        Err(ApiError::Status {
            operation: self,
            status,
            kind: self.classify(status),
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
