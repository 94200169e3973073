//! Loopback authentication and ticket store.

use std::collections::HashMap;

use async_trait::async_trait;
use kritor_core::TransportResult;
use kritor_protocol::AuthService;
use kritor_protocol::model::{
    AddTicketRequest, AuthCode, AuthenticateRequest, AuthenticateResponse,
    AuthenticationStateRequest, AuthenticationStateResponse, DeleteTicketRequest,
    GetTicketRequest, TicketResponse,
};
use parking_lot::RwLock;
use tracing::debug;

/// In-process [`AuthService`] backed by a ticket map.
#[derive(Default)]
pub struct LoopbackAuth {
    required: bool,
    tickets: RwLock<HashMap<String, Vec<String>>>,
}

impl LoopbackAuth {
    /// Creates a store that does not require authentication.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that requires authentication.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Registers an account with one valid ticket.
    pub fn with_account(self, account: impl Into<String>, ticket: impl Into<String>) -> Self {
        self.tickets
            .write()
            .entry(account.into())
            .or_default()
            .push(ticket.into());
        self
    }

    /// Returns the tickets currently valid for `account`.
    pub fn tickets(&self, account: &str) -> Vec<String> {
        self.tickets.read().get(account).cloned().unwrap_or_default()
    }

    fn check(&self, account: &str, ticket: &str) -> AuthCode {
        match self.tickets.read().get(account) {
            None => AuthCode::NoAccount,
            Some(tickets) if tickets.iter().any(|t| t == ticket) => AuthCode::Ok,
            Some(_) => AuthCode::NoTicket,
        }
    }

    fn rejected(code: AuthCode) -> TicketResponse {
        TicketResponse {
            code: code as i32,
            msg: format!("{code:?}"),
            tickets: Vec::new(),
        }
    }
}

#[async_trait]
impl AuthService for LoopbackAuth {
    async fn get_authentication_state(
        &self,
        _request: AuthenticationStateRequest,
    ) -> TransportResult<AuthenticationStateResponse> {
        Ok(AuthenticationStateResponse {
            is_required: self.required,
        })
    }

    async fn authenticate(
        &self,
        request: AuthenticateRequest,
    ) -> TransportResult<AuthenticateResponse> {
        let code = self.check(&request.account, &request.ticket);
        debug!(account = %request.account, ?code, "Authenticate");
        Ok(AuthenticateResponse {
            code: code as i32,
            msg: format!("{code:?}"),
        })
    }

    async fn get_ticket(&self, request: GetTicketRequest) -> TransportResult<TicketResponse> {
        match self.check(&request.account, &request.ticket) {
            AuthCode::Ok => Ok(TicketResponse {
                tickets: self.tickets(&request.account),
                ..Default::default()
            }),
            code => Ok(Self::rejected(code)),
        }
    }

    async fn add_ticket(&self, request: AddTicketRequest) -> TransportResult<TicketResponse> {
        match self.check(&request.account, &request.ticket) {
            AuthCode::Ok => {
                let mut tickets = self.tickets.write();
                let list = tickets.entry(request.account).or_default();
                if list.contains(&request.new_ticket) {
                    return Ok(Self::rejected(AuthCode::LogicError));
                }
                list.push(request.new_ticket);
                Ok(TicketResponse {
                    tickets: list.clone(),
                    ..Default::default()
                })
            }
            code => Ok(Self::rejected(code)),
        }
    }

    async fn delete_ticket(
        &self,
        request: DeleteTicketRequest,
    ) -> TransportResult<TicketResponse> {
        match self.check(&request.account, &request.ticket) {
            AuthCode::Ok => {
                let mut tickets = self.tickets.write();
                let list = tickets.entry(request.account).or_default();
                let before = list.len();
                list.retain(|t| *t != request.delete_ticket);
                if list.len() == before {
                    return Ok(Self::rejected(AuthCode::LogicError));
                }
                Ok(TicketResponse {
                    tickets: list.clone(),
                    ..Default::default()
                })
            }
            code => Ok(Self::rejected(code)),
        }
    }
}
