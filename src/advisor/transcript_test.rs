use super::*;

#[test]
fn new_transcript_starts_with_model_greeting() {
    let t = Transcript::new("Olá!");
    assert_eq!(t.len(), 1);
    assert!(!t.is_empty());
    assert_eq!(t.turns()[0], ChatTurn::model("Olá!", Vec::new()));
    assert!(!t.awaiting_reply());
}

#[test]
fn push_alternates_user_and_model() {
    let mut t = Transcript::new("Olá!");
    t.push(ChatTurn::user("cozinha", None)).unwrap();
    assert!(t.awaiting_reply());
    t.push(ChatTurn::model("Sugiro MDF", Vec::new())).unwrap();
    assert!(!t.awaiting_reply());
    assert_eq!(t.len(), 3);
}

#[test]
fn push_rejects_back_to_back_model_turns() {
    let mut t = Transcript::new("Olá!");
    let err = t.push(ChatTurn::model("de novo", Vec::new())).unwrap_err();
    assert_eq!(err, TranscriptError::OutOfOrder { expected: "user", got: "model" });
    assert_eq!(t.len(), 1);
}

#[test]
fn push_rejects_two_pending_user_turns() {
    let mut t = Transcript::new("Olá!");
    t.push(ChatTurn::user("um", None)).unwrap();
    assert!(t.push(ChatTurn::user("dois", None)).is_err());
    assert_eq!(t.len(), 2);
}

#[test]
fn turn_serializes_without_empty_optionals() {
    let json = serde_json::to_value(ChatTurn::model("oi", Vec::new())).unwrap();
    assert_eq!(json, serde_json::json!({ "role": "model", "text": "oi" }));
}

#[test]
fn turn_serializes_image_and_citations() {
    let mut turn = ChatTurn::user("foto", Some("Zm9v".into()));
    let json = serde_json::to_value(&turn).unwrap();
    assert_eq!(json["image"], "Zm9v");

    turn = ChatTurn::model("ok", vec![Citation { title: "A".into(), uri: "a".into() }]);
    let json = serde_json::to_value(&turn).unwrap();
    assert_eq!(json["citations"], serde_json::json!([{ "title": "A", "uri": "a" }]));
}

#[test]
fn turn_deserializes_with_defaults() {
    let turn: ChatTurn = serde_json::from_value(serde_json::json!({ "role": "user" })).unwrap();
    assert_eq!(turn, ChatTurn::user("", None));
}

#[test]
fn transcript_serializes_as_array() {
    let t = Transcript::new("Olá!");
    let json = serde_json::to_value(&t).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["role"], "model");
}
