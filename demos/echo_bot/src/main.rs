//! Echo Bot Demo
//!
//! Runs a passive-mode application against the in-process loopback
//! transport. A feeder task plays the part of the remote endpoint: it
//! publishes a handful of wire events, then asks the application to stop.
//!
//! Commands understood by the bot:
//!
//! - `/echo <text>`: replies with `<text>`
//! - `/ping`: replies with `Pong!`
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot
//! ```

use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::Result;
use kritor::prelude::*;
use kritor::transport::{LoopbackAuth, LoopbackEvents};
use kritor_protocol::model::element::TextElement;
use kritor_protocol::model::{
    ContactEnvelope, Element, ElementData, EventStructure, EventType, NoticeBody, PushMessageBody,
    SenderEnvelope,
};
use tokio::sync::oneshot;

const ACCOUNT: &str = "10001";
const TICKET: &str = "loopback-ticket";

fn text_message(scene: i32, peer: u64, uin: u64, text: &str) -> EventStructure {
    EventStructure::message(PushMessageBody {
        time: 1_700_000_000,
        message_id: format!("demo-{peer}-{uin}"),
        message_seq: 1,
        contact: Some(ContactEnvelope {
            scene,
            peer: peer.to_string(),
            sub_peer: None,
        }),
        sender: Some(SenderEnvelope {
            uid: format!("u_{uin}"),
            uin: Some(uin),
            nick: "demo".to_string(),
        }),
        elements: vec![Element::new(ElementData::Text(TextElement {
            text: text.to_string(),
        }))],
    })
}

async fn echo(app: Weak<KritorApp>, event: SharedEvent) -> HandlerResult {
    let (Some(app), Some(chain), Some(contact)) =
        (app.upgrade(), event.chain(), event.reply_contact())
    else {
        return Ok(());
    };

    let text = chain.plain_text();
    let reply = if let Some(content) = text.strip_prefix("/echo ") {
        content.to_string()
    } else if text.trim() == "/ping" {
        "Pong!".to_string()
    } else {
        return Ok(());
    };

    let response = app.send_message(contact, reply, None).await?;
    info!(message_id = %response.message_id, "Replied");
    Ok(())
}

/// Waits for the engine's subscriptions, publishes sample traffic, then
/// signals shutdown.
async fn feed(events: Arc<LoopbackEvents>, done: oneshot::Sender<()>) {
    while events.subscriber_count(EventType::Message) == 0
        || events.subscriber_count(EventType::Notice) == 0
    {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let traffic = [
        text_message(1, 20001, 20001, "/ping"),
        text_message(2, 30001, 20002, "/echo hello from a group"),
        text_message(1, 20001, 20001, "just chatting"),
        EventStructure::notice(NoticeBody {
            notice_type: 1,
            time: 1_700_000_000,
            notice_id: "demo-notice".to_string(),
            ..Default::default()
        }),
    ];
    for event in traffic {
        events.publish(event).await;
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    let _ = done.send(());
}

#[tokio::main]
async fn main() -> Result<()> {
    let transport =
        LoopbackTransport::new().with_auth(LoopbackAuth::required().with_account(ACCOUNT, TICKET));

    let app = Arc::new(
        KritorApp::builder()
            .merge(KritorConfig {
                account: Some(ACCOUNT.to_string()),
                ticket: Some(TICKET.to_string()),
                ..Default::default()
            })
            .event_service(transport.events.clone())
            .auth_service(transport.auth.clone())
            .message_service(transport.messages.clone())
            .build()?,
    );

    let weak = Arc::downgrade(&app);
    app.on_message(move |event| echo(weak.clone(), event));
    app.on_message_blocking(|event| {
        if let Some(chain) = event.chain() {
            info!(sender = ?event.sender_id(), text = %chain.plain_text(), "Message");
        }
        Ok(())
    });
    app.on_notice(|event| async move {
        info!(event = event.event_name(), "Notice");
        Ok(())
    });

    app.authenticate().await?;

    let (done_tx, done_rx) = oneshot::channel();
    tokio::spawn(feed(transport.events.clone(), done_tx));

    let report = app
        .run_until(async move {
            tokio::select! {
                _ = done_rx => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        })
        .await?;

    for request in transport.messages.take_sent() {
        info!(
            peer = %request.contact.peer,
            scene = request.contact.scene,
            elements = request.elements.len(),
            "Sent"
        );
    }
    if !report.is_clean() {
        warn!(timed_out = ?report.timed_out, "Some units did not stop in time");
    }

    Ok(())
}
