//! Integration tests for bridgewire.
//!
//! These tests verify the integration between different modules.

use std::sync::Arc;

use bridgewire::codec::{Value, ValueKind};
use bridgewire::config::{BridgeConfig, Limits};
use bridgewire::error::ErrorCode;
use bridgewire::handler::{BridgeHandler, ConstructorTable, MessageHandler, ObjectHandle};
use bridgewire::messages::{
    BoolMessage, CreateObjectMessage, ErrorMessage, Int32Message, Int64Message, ObjectRefMessage,
    Real64Message, StringMessage, ValueArrayMessage,
};
use bridgewire::protocol::{type_codes, Dispatcher, Message, MessageBuffer, MessageRegistry, MAGIC};
use bridgewire::{BridgeError, Session};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(MessageRegistry::standard().unwrap()))
}

fn roundtrip(message: &dyn Message) -> Box<dyn Message> {
    let d = dispatcher();
    let bytes = d.encode(message).unwrap();
    d.decode(&bytes, Limits::default()).unwrap()
}

/// Every standard kind decodes back to an equal message.
#[test]
fn test_every_registered_kind_roundtrips() {
    let registry = MessageRegistry::standard().unwrap();

    let create = CreateObjectMessage::new(
        "Shapes.Polygon",
        vec![
            Value::Null,
            Value::Bool(true),
            Value::Int32(-7),
            Value::Int64(1 << 40),
            Value::Real64(0.5),
            Value::from("name"),
            Value::from(vec![Value::Int32(1), Value::from(vec![Value::Null])]),
        ],
    );
    let object_ref = ObjectRefMessage::new(ObjectHandle::new(12));
    let error = ErrorMessage::new(ErrorCode::ConstructionFailure, "no such class");
    let string = StringMessage::new("héllo");
    let array = ValueArrayMessage::new(vec![Value::Int64(-1), Value::from("x")]);

    let decoded = roundtrip(&create);
    assert_eq!(decoded.downcast_ref::<CreateObjectMessage>(), Some(&create));
    let decoded = roundtrip(&object_ref);
    assert_eq!(decoded.downcast_ref::<ObjectRefMessage>(), Some(&object_ref));
    let decoded = roundtrip(&error);
    assert_eq!(decoded.downcast_ref::<ErrorMessage>(), Some(&error));
    let decoded = roundtrip(&string);
    assert_eq!(decoded.downcast_ref::<StringMessage>(), Some(&string));
    let decoded = roundtrip(&array);
    assert_eq!(decoded.downcast_ref::<ValueArrayMessage>(), Some(&array));
    let decoded = roundtrip(&BoolMessage::new(true));
    assert_eq!(decoded.downcast_ref::<BoolMessage>(), Some(&BoolMessage::new(true)));
    let decoded = roundtrip(&Int32Message::new(-3));
    assert_eq!(decoded.downcast_ref::<Int32Message>(), Some(&Int32Message::new(-3)));
    let decoded = roundtrip(&Int64Message::new(i64::MIN));
    assert_eq!(
        decoded.downcast_ref::<Int64Message>(),
        Some(&Int64Message::new(i64::MIN))
    );
    let decoded = roundtrip(&Real64Message::new(-2.25));
    assert_eq!(
        decoded.downcast_ref::<Real64Message>(),
        Some(&Real64Message::new(-2.25))
    );

    assert_eq!(registry.len(), 9);
}

#[test]
fn test_create_string_object_command() {
    let message = CreateObjectMessage::new("System.String", vec![Value::from("hi")]);
    let decoded = roundtrip(&message);
    let decoded = decoded.downcast::<CreateObjectMessage>().unwrap();

    assert_eq!(decoded.class_name, "System.String");
    assert_eq!(decoded.parameters.len(), 1);
    assert_eq!(decoded.parameters[0], Value::String("hi".to_string()));
}

#[test]
fn test_create_without_arguments() {
    let bytes = dispatcher()
        .encode(&CreateObjectMessage::new("Foo", vec![]))
        .unwrap();
    // header(4) + len(4) + "Foo"(3) + count(2)
    assert_eq!(bytes.len(), 13);
    assert_eq!(&bytes[11..], &[0, 0]);

    let decoded = dispatcher().decode(&bytes, Limits::default()).unwrap();
    let decoded = decoded.downcast_ref::<CreateObjectMessage>().unwrap();
    assert!(decoded.parameters.is_empty());
}

#[test]
#[allow(clippy::approx_constant)]
fn test_real64_exact_and_nan() {
    let decoded = roundtrip(&Real64Message::new(3.14159));
    assert_eq!(decoded.downcast_ref::<Real64Message>().unwrap().value, 3.14159);

    let nan = f64::from_bits(0x7FF0_0000_DEAD_BEEF);
    let decoded = roundtrip(&Real64Message::new(nan));
    assert_eq!(
        decoded.downcast_ref::<Real64Message>().unwrap().value.to_bits(),
        nan.to_bits()
    );
}

#[test]
fn test_wrong_magic_reported_before_type_code() {
    // Magic is wrong and the type code is missing entirely
    let err = dispatcher()
        .decode(&[0xEF, 0xBE], Limits::default())
        .unwrap_err();
    match err {
        BridgeError::ProtocolMismatch { expected, found } => {
            assert_eq!(expected, MAGIC);
            assert_eq!(found, 0xBEEF);
        }
        other => panic!("expected ProtocolMismatch, got {:?}", other),
    }
}

#[test]
fn test_unregistered_type_code() {
    let mut bytes = MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&0x4242u16.to_le_bytes());

    let err = dispatcher().decode(&bytes, Limits::default()).unwrap_err();
    assert!(matches!(err, BridgeError::UnknownMessageType(0x4242)));
    assert!(err.is_framing());
}

#[test]
fn test_parameter_count_bounds() {
    let d = dispatcher();

    let max = CreateObjectMessage::new("Big", vec![Value::Bool(false); 65535]);
    let bytes = d.encode(&max).unwrap();
    let decoded = d.decode(&bytes, Limits::default()).unwrap();
    assert_eq!(
        decoded
            .downcast_ref::<CreateObjectMessage>()
            .unwrap()
            .parameters
            .len(),
        65535
    );

    let over = CreateObjectMessage::new("Big", vec![Value::Bool(false); 65536]);
    let err = d.encode(&over).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_oversized_string_rejected_before_allocation() {
    let mut bytes = MAGIC.to_le_bytes().to_vec();
    bytes.extend_from_slice(&type_codes::STRING.to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());

    let limits = Limits {
        max_string_len: 1024,
        ..Limits::default()
    };
    let err = dispatcher().decode(&bytes, limits).unwrap_err();
    assert!(matches!(err, BridgeError::MalformedMessage(_)));
}

#[test]
fn test_custom_registry_rejects_duplicates() {
    let err = MessageRegistry::builder()
        .register::<Real64Message>()
        .register::<Real64Message>()
        .build()
        .unwrap_err();
    assert!(matches!(err, BridgeError::Registry(_)));
}

#[test]
fn test_json_values_feed_create_command() {
    let json = serde_json::json!(["Point", 1, 2.5, [true, null]]);
    let mut values = match Value::try_from(json).unwrap() {
        Value::Sequence(values) => values,
        other => panic!("expected a sequence, got {:?}", other),
    };
    let class_name = values.remove(0);

    let message = CreateObjectMessage::new(class_name.as_str().unwrap(), values);
    let decoded = roundtrip(&message);
    let decoded = decoded.downcast_ref::<CreateObjectMessage>().unwrap();
    assert_eq!(
        decoded.parameters,
        vec![
            Value::Int32(1),
            Value::Real64(2.5),
            Value::from(vec![Value::Bool(true), Value::Null]),
        ]
    );
}

// ---------------------------------------------------------------------------
// Session tests
// ---------------------------------------------------------------------------

fn point_table() -> ConstructorTable {
    let mut table = ConstructorTable::new();
    table.register("Point", &[ValueKind::Int32, ValueKind::Int32], |args| {
        match (args[0].as_i32(), args[1].as_i32()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err("expected two int32".to_string()),
        }
    });
    table
}

/// Read replies from `client` until `count` messages have been decoded.
async fn read_replies(
    client: &mut DuplexStream,
    buffer: &mut MessageBuffer,
    count: usize,
) -> Vec<Box<dyn Message>> {
    let mut replies = Vec::new();
    let mut buf = [0u8; 256];
    while replies.len() < count {
        let n = client.read(&mut buf).await.unwrap();
        assert!(n > 0, "session closed before replying");
        replies.extend(buffer.push(&buf[..n]).unwrap());
    }
    replies
}

#[tokio::test]
async fn test_session_create_and_error_reply() {
    let handler = Arc::new(BridgeHandler::new(point_table()));
    let session = Session::new(
        Arc::new(MessageRegistry::standard().unwrap()),
        handler.clone() as Arc<dyn MessageHandler>,
        BridgeConfig::default().read_buffer_size(16),
    );

    let (mut client, server) = tokio::io::duplex(4096);
    let task = tokio::spawn(async move { session.run(server).await });

    let d = dispatcher();
    let mut request: Vec<u8> = Vec::new();
    d.write_message(
        &mut request,
        &CreateObjectMessage::new("Point", vec![Value::Int32(3), Value::Int32(4)]),
    )
    .unwrap();
    d.write_message(
        &mut request,
        &CreateObjectMessage::new("Point", vec![Value::Real64(3.0), Value::Int32(4)]),
    )
    .unwrap();
    d.write_message(&mut request, &StringMessage::new("after the failure"))
        .unwrap();
    client.write_all(&request).await.unwrap();

    let mut buffer = MessageBuffer::new(d, Limits::default());
    let replies = read_replies(&mut client, &mut buffer, 2).await;

    let object_ref = replies[0].downcast_ref::<ObjectRefMessage>().unwrap();
    assert_eq!(
        handler
            .resolver()
            .with_object(object_ref.handle, |p: &(i32, i32)| *p),
        Some((3, 4))
    );

    let error = replies[1].downcast_ref::<ErrorMessage>().unwrap();
    assert_eq!(error.code, ErrorCode::ConstructionFailure);
    assert!(error.text.contains("Point"));

    client.shutdown().await.unwrap();
    drop(client);

    let stats = task.await.unwrap().unwrap();
    assert_eq!(stats.messages_received, 3);
    assert_eq!(stats.replies_sent, 2);
    assert_eq!(stats.errors_reported, 1);
    assert_eq!(handler.take_values(), vec![Value::from("after the failure")]);
}

#[tokio::test]
async fn test_session_closes_on_bad_magic() {
    let session = Session::new(
        Arc::new(MessageRegistry::standard().unwrap()),
        Arc::new(BridgeHandler::new(point_table())),
        BridgeConfig::default(),
    );

    let (mut client, server) = tokio::io::duplex(64);
    let task = tokio::spawn(async move { session.run(server).await });

    client.write_all(&[0x00, 0x00, 0x01, 0x00]).await.unwrap();

    let err = task.await.unwrap().unwrap_err();
    assert!(matches!(err, BridgeError::ProtocolMismatch { .. }));

    // Nothing was written back
    let mut buf = [0u8; 1];
    assert_eq!(client.read(&mut buf).await.unwrap(), 0);
}
