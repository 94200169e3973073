#![allow(dead_code)]

use std::time::Duration;

use kritor_protocol::model::element::TextElement;
use kritor_protocol::model::{
    ContactEnvelope, CoreBody, Element, ElementData, EventStructure, NoticeBody, PushMessageBody,
    RequestBody, SenderEnvelope,
};
use kritor_runtime::EngineOptions;

pub fn friend_message(peer: u64, text: &str) -> EventStructure {
    message_in_scene(1, peer, text)
}

pub fn message_in_scene(scene: i32, peer: u64, text: &str) -> EventStructure {
    EventStructure::message(PushMessageBody {
        time: 1_700_000_000,
        message_id: format!("msg-{peer}"),
        message_seq: 7,
        contact: Some(ContactEnvelope {
            scene,
            peer: peer.to_string(),
            sub_peer: None,
        }),
        sender: Some(SenderEnvelope {
            uid: peer.to_string(),
            uin: Some(peer),
            nick: "tester".to_string(),
        }),
        elements: vec![Element::new(ElementData::Text(TextElement {
            text: text.to_string(),
        }))],
    })
}

pub fn notice() -> EventStructure {
    EventStructure::notice(NoticeBody {
        notice_type: 1,
        time: 1_700_000_000,
        notice_id: "notice-1".to_string(),
        ..Default::default()
    })
}

pub fn request() -> EventStructure {
    EventStructure::request(RequestBody {
        request_type: 1,
        time: 1_700_000_000,
        request_id: "request-1".to_string(),
        ..Default::default()
    })
}

pub fn core() -> EventStructure {
    EventStructure::core(CoreBody::default())
}

pub fn options(join_timeout_ms: u64) -> EngineOptions {
    EngineOptions {
        join_timeout: Duration::from_millis(join_timeout_ms),
        resubscribe_delay: Duration::from_millis(20),
    }
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
