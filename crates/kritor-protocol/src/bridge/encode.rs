//! Canonical → wire encoding for outbound messages.

use kritor_core::{Contact, MediaKind, MediaPayload, MessageChain, MessageElement, Multimedia};

use crate::model::element::{
    AtElement, BubbleFaceElement, DiceElement, FaceElement, ImageElement, ReplyElement,
    TextElement, VideoElement, VoiceElement,
};
use crate::model::{ContactEnvelope, Element, ElementData, MediaData};

/// Encodes a chain into wire elements, preserving order.
pub fn encode_chain(chain: &MessageChain) -> Vec<Element> {
    chain.iter().map(encode_element).collect()
}

/// Encodes one canonical element.
pub fn encode_element(element: &MessageElement) -> Element {
    let data = match element {
        MessageElement::Plain(plain) => ElementData::Text(TextElement {
            text: plain.text.clone(),
        }),
        MessageElement::At(at) => ElementData::At(AtElement {
            uid: at.target.clone(),
            uin: at.target.parse().ok(),
        }),
        MessageElement::AtAll => ElementData::At(AtElement {
            uid: "all".to_string(),
            uin: None,
        }),
        MessageElement::Face(face) => ElementData::Face(FaceElement {
            id: face.id,
            is_big: Some(face.is_big),
            result: None,
        }),
        MessageElement::BubbleFace(face) => ElementData::BubbleFace(BubbleFaceElement {
            id: face.id,
            count: face.count,
        }),
        MessageElement::Quote(quote) => ElementData::Reply(ReplyElement {
            message_id: quote.message_id.clone(),
        }),
        MessageElement::Multimedia(media) => encode_media(media),
        MessageElement::Dice(dice) => ElementData::Dice(DiceElement { id: dice.value }),
    };
    Element::new(data)
}

fn encode_media(media: &Multimedia) -> ElementData {
    let data = Some(match &media.payload {
        MediaPayload::Inline(bytes) => MediaData::File(bytes.clone()),
        MediaPayload::LocalPath(path) => MediaData::FilePath(path.clone()),
        MediaPayload::RemotePath(name) => MediaData::FileName(name.clone()),
        MediaPayload::Url(url) => MediaData::FileUrl(url.clone()),
    });
    let file_md5 = media.hash.clone();

    match media.kind {
        MediaKind::Image => ElementData::Image(ImageElement {
            data,
            file_md5,
            sub_type: None,
        }),
        MediaKind::Voice => ElementData::Voice(VoiceElement {
            data,
            file_md5,
            magic: None,
        }),
        MediaKind::Video => ElementData::Video(VideoElement { data, file_md5 }),
    }
}

/// Encodes a routing target.
pub fn encode_contact(contact: &Contact) -> ContactEnvelope {
    ContactEnvelope {
        scene: contact.scene.code(),
        peer: contact.peer.to_string(),
        sub_peer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::decode::{decode_elements, decode_sender};
    use crate::model::SenderEnvelope;
    use kritor_core::{Friend, Group, Scene, Sender, to_contact};

    #[test]
    fn test_round_trip_plain_and_at() {
        let chain = MessageChain::new().text("hi").at(123);
        let wire = encode_chain(&chain);

        assert_eq!(wire.len(), 2);
        assert_eq!(decode_elements(&wire), chain);
    }

    #[test]
    fn test_round_trip_all_variants() {
        let chain = MessageChain::new()
            .text("hello")
            .at_all()
            .face(14)
            .element(MessageElement::bubble_face(2, 5))
            .quote("m-9")
            .image(MediaPayload::Url("https://x/a.png".into()))
            .element(MessageElement::voice(MediaPayload::Inline(vec![1, 2, 3])))
            .element(MessageElement::video(MediaPayload::RemotePath("v.mp4".into())))
            .dice(6);

        assert_eq!(decode_elements(&encode_chain(&chain)), chain);
    }

    #[test]
    fn test_contact_is_inverse_of_sender_resolution() {
        let contact = encode_contact(&to_contact(&Group::shell(555)));
        assert_eq!(contact.scene, Scene::Group.code());

        let sender = SenderEnvelope {
            uid: String::new(),
            uin: Some(7),
            nick: "n".into(),
        };
        let Ok(Sender::Member(member)) = decode_sender(&contact, &sender) else {
            panic!("expected a member");
        };
        assert_eq!(member.group.id, 555);

        let friend = Friend {
            id: 7,
            ..Default::default()
        };
        let contact = encode_contact(&to_contact(&friend));
        assert_eq!(contact.scene, Scene::Friend.code());
        assert_eq!(contact.peer, "7");
    }
}
