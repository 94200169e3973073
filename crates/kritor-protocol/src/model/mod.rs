//! Wire model mirroring the Kritor message shapes.

pub mod auth;
pub mod element;
pub mod envelope;
pub mod event;
pub mod message;

pub use auth::{
    AddTicketRequest, AuthCode, AuthenticateRequest, AuthenticateResponse,
    AuthenticationStateRequest, AuthenticationStateResponse, DeleteTicketRequest,
    GetTicketRequest, TicketResponse,
};
pub use element::{Element, ElementData, ElementType, MediaData};
pub use envelope::{ContactEnvelope, SenderEnvelope};
pub use event::{
    CoreBody, EventBody, EventStructure, EventType, NoticeBody, PushAck, PushMessageBody,
    RequestBody,
};
pub use message::{SendMessageRequest, SendMessageResponse};
