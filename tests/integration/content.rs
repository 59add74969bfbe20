use crate::*;

use std::collections::HashMap;
use std::io::Read;

use bytes::Bytes;
use courier_core::content::{ByteStream, ContentError, CONTENT_TYPE_JSON};
use courier_core::{Content, Payload};
use courier_exchange::http::execute;
use courier_exchange::Timed;
use courier_messaging::message::channel;
use courier_messaging::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Point {
    x: i32,
}

/// A live JSON response decodes through the envelope into a typed value.
#[tokio::test]
async fn http_json_body_decodes_to_struct() -> Result<()> {
    let addr = spawn_server().await?;
    let client = client();
    let resp = execute(&client, &Timed::new(get(&client, addr, "/json"))).await?;

    let content = resp.content();
    assert_eq!(content.content_type(), CONTENT_TYPE_JSON);
    assert_eq!(content.read::<Point>()?, Point { x: 1 });
    let map: HashMap<String, i32> = content.decode()?;
    assert_eq!(map["x"], 1);

    // Wrong representation for the tag.
    assert!(matches!(
        content.read::<String>(),
        Err(ContentError::InvalidContentType { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn http_text_body_reads_as_string_only() -> Result<()> {
    let addr = spawn_server().await?;
    let client = client();
    let resp = execute(&client, &Timed::new(get(&client, addr, "/text"))).await?;

    let content = resp.content();
    assert_eq!(content.read::<String>()?, "hello");
    assert!(content.read::<Bytes>().is_err());
    assert!(content.read::<Point>().is_err());
    Ok(())
}

/// Native values become JSON on the way out, which another envelope can
/// decode again.
#[test]
fn native_value_encodes_for_the_wire() -> Result<()> {
    let outbound = Content::new(CONTENT_TYPE_JSON, Payload::value(Point { x: 7 }));

    let mut stream: ByteStream = outbound.encode()?;
    let mut wire = Vec::new();
    stream.read_to_end(&mut wire)?;
    assert_eq!(wire, br#"{"x":7}"#);

    let inbound = Content::new(CONTENT_TYPE_JSON, wire);
    assert_eq!(inbound.read::<Point>()?, Point { x: 7 });
    Ok(())
}

/// A message carries typed content end to end.
#[test]
fn message_content_round_trip() -> Result<()> {
    let mut m = Message::new(channel::DATA, "test:agent/event/point");
    m.set_content(CONTENT_TYPE_JSON, Payload::value(Point { x: 3 }));
    assert_eq!(m.read_content::<Point>()?, Point { x: 3 });

    let bytes: Vec<u8> = courier_core::content::encode(m.content())?;
    let mut relayed = Message::new(channel::DATA, "test:agent/event/point");
    relayed.set_content(CONTENT_TYPE_JSON, bytes);
    assert_eq!(relayed.read_content::<Point>()?, Point { x: 3 });
    Ok(())
}
