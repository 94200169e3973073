//! Authentication and ticket request/response pairs.

use serde::{Deserialize, Serialize};

/// Result codes returned by the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum AuthCode {
    Ok = 0,
    NoAccount = 1,
    NoTicket = 2,
    LogicError = 3,
}

impl AuthCode {
    /// Returns the code for a wire value, if it is known.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::NoAccount),
            2 => Some(Self::NoTicket),
            3 => Some(Self::LogicError),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthenticationStateRequest {
    pub account: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthenticationStateResponse {
    pub is_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    pub account: String,
    pub ticket: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
}

impl AuthenticateResponse {
    /// Returns `true` when the code is [`AuthCode::Ok`].
    pub fn is_ok(&self) -> bool {
        self.code == AuthCode::Ok as i32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetTicketRequest {
    pub account: String,
    pub ticket: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddTicketRequest {
    pub account: String,
    pub ticket: String,
    pub new_ticket: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteTicketRequest {
    pub account: String,
    pub ticket: String,
    pub delete_ticket: String,
}

/// Response shared by the ticket operations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TicketResponse {
    pub code: i32,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub tickets: Vec<String>,
}
