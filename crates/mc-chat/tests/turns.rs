use std::fs;

use mc_chat::{ChatEngine, ReplyKind, Transcript, UserContext};

#[test]
fn a_full_session_routes_math_prose_and_help() {
    let engine = ChatEngine::new();
    let context = UserContext::named("grace");
    let mut transcript = Transcript::new("grace");

    let turns = [
        ("hi", ReplyKind::Greeting),
        ("2 + 2 * 3", ReplyKind::Calculation),
        ("factorial(-1)", ReplyKind::CalculationFailed),
        ("math help", ReplyKind::Help),
        ("tell me something", ReplyKind::SmallTalk),
        ("goodbye", ReplyKind::Farewell),
    ];

    for (message, expected_kind) in turns {
        let reply = engine.respond(message, &context);
        assert_eq!(reply.kind, expected_kind, "wrong route for {message:?}");
        transcript.record(message, &reply.text).expect("record turn");
    }

    assert_eq!(transcript.entries().len(), turns.len());
    assert_eq!(transcript.entries()[1].bot_response, "the answer is: **8**");
}

#[test]
fn exported_transcripts_round_trip_through_a_file() {
    let engine = ChatEngine::new();
    let context = UserContext::named("grace");
    let mut transcript = Transcript::new("grace");

    for message in ["sqrt(16)", "10 / 4"] {
        let reply = engine.respond(message, &context);
        transcript.record(message, &reply.text).expect("record turn");
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("transcript.json");
    fs::write(&path, transcript.export_json().expect("export")).expect("write");

    let raw = fs::read_to_string(&path).expect("read back");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(value["user"], "grace");
    let history = value["chat_history"].as_array().expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["bot_response"], "the answer is: **4**");
    assert_eq!(history[1]["bot_response"], "the answer is: **2.5**");
}

#[test]
fn injection_attempts_never_reach_a_calculated_reply() {
    let engine = ChatEngine::new();
    let context = UserContext::default();

    for message in [
        "__import__('os').system('ls')",
        "exec('print(1)')",
        "[x for x in range(10)]",
        "lambda: 1",
    ] {
        let reply = engine.respond(message, &context);
        assert_ne!(
            reply.kind,
            ReplyKind::Calculation,
            "injection classified as math: {message:?}"
        );
    }
}
