//! Wire → canonical decoding.
//!
//! Everything here is pure: no I/O and no shared state. The only error a
//! well-formed wire message can produce is an unresolvable contact, which
//! fails the whole event before any element is looked at.
//!
//! # Tolerance
//!
//! Elements are selected by their populated slot, never by the numeric
//! `type` tag. Slots without a canonical counterpart, and elements with no
//! slot at all, are dropped with a `debug` log line. A message with `N`
//! mapped and `M` dropped elements always decodes to a chain of length `N`
//! in wire order.

use kritor_core::{
    CorePayload, DecodeError, DecodeResult, DomainEvent, Friend, Group, MediaKind, MediaPayload,
    Member, MemberPerm, MessageChain, MessageElement, Multimedia, NoticePayload, RequestPayload,
    Scene, Sender, Source,
    message::{At, BubbleFace, Dice, Face, Plain, Quote},
};
use tracing::{debug, trace};

use crate::model::{
    ContactEnvelope, CoreBody, Element, ElementData, EventBody, EventStructure, EventType,
    MediaData, NoticeBody, PushMessageBody, RequestBody, SenderEnvelope,
};

// ============================================================================
// Events
// ============================================================================

/// Decodes a wire event of any category.
pub fn decode_event(event: &EventStructure) -> DecodeResult<DomainEvent> {
    match &event.event {
        Some(EventBody::Message(body)) => {
            let (chain, source, sender) = decode_push_message(body)?;
            Ok(DomainEvent::from_message(chain, source, sender))
        }
        Some(EventBody::Notice(body)) => Ok(DomainEvent::NoticeEvent(decode_notice(body))),
        Some(EventBody::Request(body)) => Ok(DomainEvent::RequestEvent(decode_request(body))),
        Some(EventBody::Core(body)) => Ok(DomainEvent::CoreEvent(decode_core(body))),
        None => match EventType::from_code(event.event_type) {
            Some(EventType::CoreEvent) => Ok(DomainEvent::CoreEvent(CorePayload::default())),
            _ => Err(DecodeError::MissingEnvelope("event")),
        },
    }
}

/// Decodes a pushed chat message into its chain, source and sender.
pub fn decode_push_message(
    body: &PushMessageBody,
) -> DecodeResult<(MessageChain, Source, Sender)> {
    let contact = body
        .contact
        .as_ref()
        .ok_or(DecodeError::MissingEnvelope("contact"))?;
    let sender = body
        .sender
        .as_ref()
        .ok_or(DecodeError::MissingEnvelope("sender"))?;

    let (chain, sender) = decode_message(&body.elements, contact, sender)?;
    let source = decode_source(body);

    trace!(
        seq = source.id,
        elements = body.elements.len(),
        decoded = chain.len(),
        "Decoded message"
    );

    Ok((chain, source, sender))
}

/// Decodes message elements together with the sender they came from.
///
/// The sender is resolved first, so an unsupported scene fails before any
/// element is looked at.
pub fn decode_message(
    elements: &[Element],
    contact: &ContactEnvelope,
    sender: &SenderEnvelope,
) -> DecodeResult<(MessageChain, Sender)> {
    let sender = decode_sender(contact, sender)?;
    Ok((decode_elements(elements), sender))
}

/// Builds the [`Source`] of a pushed message.
pub fn decode_source(body: &PushMessageBody) -> Source {
    Source::new(body.message_seq, body.message_id.clone(), body.time)
}

fn decode_notice(body: &NoticeBody) -> NoticePayload {
    NoticePayload {
        notice_type: body.notice_type,
        time: body.time,
        notice_id: body.notice_id.clone(),
        data: body.detail.clone(),
    }
}

fn decode_request(body: &RequestBody) -> RequestPayload {
    RequestPayload {
        request_type: body.request_type,
        time: body.time,
        request_id: body.request_id.clone(),
        data: body.detail.clone(),
    }
}

fn decode_core(body: &CoreBody) -> CorePayload {
    CorePayload {
        time: body.time,
        data: body.detail.clone(),
    }
}

// ============================================================================
// Sender
// ============================================================================

/// Resolves the sender of a message from its contact scene.
///
/// Only group and friend scenes can be resolved. Any other scene, known or
/// not, is a [`DecodeError::UnsupportedScene`]. Ids never fail: a sender
/// known only by a string uid resolves to account 0.
pub fn decode_sender(contact: &ContactEnvelope, sender: &SenderEnvelope) -> DecodeResult<Sender> {
    match Scene::from_code(contact.scene) {
        Some(Scene::Group) => Ok(Sender::Member(Member {
            id: resolve_account(sender, None),
            member_name: sender.nick.clone(),
            permission: MemberPerm::Member,
            group: Group::shell(resolve_group(&contact.peer)),
            ..Default::default()
        })),
        Some(Scene::Friend) => Ok(Sender::Friend(Friend {
            id: resolve_account(sender, Some(&contact.peer)),
            nickname: sender.nick.clone(),
            remark: String::new(),
        })),
        Some(
            Scene::Guild | Scene::Nearby | Scene::Stranger | Scene::StrangerFromGroup,
        )
        | None => Err(DecodeError::UnsupportedScene(contact.scene)),
    }
}

/// `uin`, then a numeric `uid`, then a numeric friend peer, then 0.
fn resolve_account(sender: &SenderEnvelope, peer: Option<&str>) -> u64 {
    sender
        .account_id()
        .or_else(|| peer.and_then(|peer| peer.parse().ok()))
        .unwrap_or_else(|| {
            debug!(uid = %sender.uid, "Sender has no numeric account id");
            0
        })
}

fn resolve_group(peer: &str) -> u64 {
    peer.parse().unwrap_or_else(|_| {
        debug!(peer, "Group peer is not numeric");
        0
    })
}

// ============================================================================
// Elements
// ============================================================================

/// Decodes wire elements into a chain, dropping unmapped ones.
pub fn decode_elements(elements: &[Element]) -> MessageChain {
    elements.iter().filter_map(decode_element).collect()
}

/// Decodes one wire element.
///
/// Returns `None` for slots that have no canonical counterpart.
pub fn decode_element(element: &Element) -> Option<MessageElement> {
    let Some(data) = &element.data else {
        debug!(
            element_type = element.element_type,
            "Dropping wire element with no populated slot"
        );
        return None;
    };

    match data {
        ElementData::Text(text) => Some(MessageElement::Plain(Plain {
            text: text.text.clone(),
        })),
        ElementData::At(at) => {
            if at.uid == "all" || (at.uid.is_empty() && at.uin == Some(0)) {
                Some(MessageElement::AtAll)
            } else {
                let target = match at.uin {
                    Some(uin) if at.uid.is_empty() => uin.to_string(),
                    _ => at.uid.clone(),
                };
                Some(MessageElement::At(At { target }))
            }
        }
        ElementData::Face(face) => Some(MessageElement::Face(Face {
            id: face.id,
            name: None,
            is_big: face.is_big.unwrap_or(false),
        })),
        ElementData::BubbleFace(face) => Some(MessageElement::BubbleFace(BubbleFace {
            id: face.id,
            count: face.count,
        })),
        ElementData::Reply(reply) => Some(MessageElement::Quote(Quote {
            message_id: reply.message_id.clone(),
        })),
        ElementData::Image(image) => {
            decode_media(MediaKind::Image, image.data.as_ref(), image.file_md5.as_deref())
        }
        ElementData::Voice(voice) => {
            decode_media(MediaKind::Voice, voice.data.as_ref(), voice.file_md5.as_deref())
        }
        ElementData::Video(video) => {
            decode_media(MediaKind::Video, video.data.as_ref(), video.file_md5.as_deref())
        }
        ElementData::Dice(dice) => Some(MessageElement::Dice(Dice { value: dice.id })),
        ElementData::Basketball(_)
        | ElementData::Rps(_)
        | ElementData::Poke(_)
        | ElementData::Music(_)
        | ElementData::Weather(_)
        | ElementData::Location(_)
        | ElementData::Share(_)
        | ElementData::Gift(_)
        | ElementData::MarketFace(_)
        | ElementData::Forward(_)
        | ElementData::Contact(_)
        | ElementData::Json(_)
        | ElementData::Xml(_)
        | ElementData::File(_)
        | ElementData::Markdown(_)
        | ElementData::Keyboard(_) => {
            debug!(slot = data.slot_name(), "Dropping unmapped wire element");
            None
        }
    }
}

fn decode_media(
    kind: MediaKind,
    data: Option<&MediaData>,
    hash: Option<&str>,
) -> Option<MessageElement> {
    let Some(data) = data else {
        debug!(kind = ?kind, "Dropping media element with no payload");
        return None;
    };

    let payload = match data {
        MediaData::File(bytes) => MediaPayload::Inline(bytes.clone()),
        MediaData::FilePath(path) => MediaPayload::LocalPath(path.clone()),
        MediaData::FileName(name) => MediaPayload::RemotePath(name.clone()),
        MediaData::FileUrl(url) => MediaPayload::Url(url.clone()),
    };

    Some(MessageElement::Multimedia(Multimedia {
        kind,
        payload,
        hash: hash.map(str::to_owned),
    }))
}
