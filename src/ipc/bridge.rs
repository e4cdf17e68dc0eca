//! IPC bridge: stdin reader and stdout event emitter.
//!
//! A blocking stdin reader thread sends deserialized commands through an
//! mpsc channel; a single writer task drains the event channel to stdout as
//! JSON lines.

use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::{SessionCommand, SessionEvent};

/// Write every event from `events` to `out` as JSON lines, in order,
/// until all senders are gone.
pub async fn forward_events<W: Write>(
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    out: &mut W,
) {
    while let Some(event) = events.recv().await {
        // Ignore write/flush errors, the pipe may be closed.
        let _ = write_event(out, &event);
    }
}

/// Serialize one event as a JSON line into `out`.
pub fn write_event<W: Write>(out: &mut W, event: &SessionEvent) -> io::Result<()> {
    let json = serde_json::to_string(event).map_err(io::Error::other)?;
    writeln!(out, "{}", json)?;
    out.flush()
}

/// Normalize incoming JSON: if it has a `"type"` field but no `"command"`
/// field, rename `"type"` to `"command"` so serde can deserialize it.
fn normalize_command_json(input: &str) -> String {
    if let Ok(mut obj) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(input)
    {
        if !obj.contains_key("command") {
            if let Some(type_val) = obj.remove("type") {
                obj.insert("command".to_string(), type_val);
                if let Ok(json) = serde_json::to_string(&obj) {
                    return json;
                }
            }
        }
    }
    input.to_string()
}

/// Parse one input line. `None` for blank lines.
pub fn parse_command(line: &str) -> Option<Result<SessionCommand, serde_json::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(serde_json::from_str::<SessionCommand>(&normalize_command_json(trimmed)))
}

/// Spawn a blocking thread that reads JSON lines from stdin, deserializes
/// them into `SessionCommand`, and forwards them through the returned channel.
///
/// Lines that fail to parse are forwarded as `Err` with a description. The
/// thread exits when stdin is closed (host gone) or on read error.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<Result<SessionCommand, String>> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = io::stdin();
        let reader = stdin.lock();
        for line in reader.lines() {
            let forwarded = match line {
                Ok(text) => match parse_command(&text) {
                    None => continue,
                    Some(Ok(cmd)) => {
                        debug!(?cmd, "Received command from host");
                        tx.send(Ok(cmd))
                    }
                    Some(Err(e)) => {
                        error!("Invalid JSON command: {} (input: {})", e, text.trim());
                        tx.send(Err(format!("Invalid JSON command: {}", e)))
                    }
                },
                Err(e) => {
                    error!("stdin read error: {}", e);
                    break;
                }
            };
            if forwarded.is_err() {
                break; // Receiver dropped, main task is gone.
            }
        }
        debug!("stdin reader thread exiting");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SinkId;
    use crate::graph::OutputNode;

    #[test]
    fn parses_tagged_commands() {
        let cmd = parse_command(r#"{"command":"toggle_recording"}"#).unwrap().unwrap();
        assert!(matches!(cmd, SessionCommand::ToggleRecording {}));

        let cmd = parse_command(
            r#"{"command":"editor_change","isDirty":true,"activeCode":"s(\"bd\")"}"#,
        )
        .unwrap()
        .unwrap();
        match cmd {
            SessionCommand::EditorChange {
                is_dirty,
                active_code,
            } => {
                assert!(is_dirty);
                assert_eq!(active_code.as_deref(), Some("s(\"bd\")"));
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn accepts_type_instead_of_command() {
        let cmd = parse_command(r#"{"type":"graph_ready","contextId":"ctx","outputNode":"gain"}"#)
            .unwrap()
            .unwrap();
        match cmd {
            SessionCommand::GraphReady {
                context_id,
                output_node,
            } => {
                assert_eq!(context_id.id(), "ctx");
                assert_eq!(output_node, Some(OutputNode::new("gain")));
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn blank_and_invalid_lines() {
        assert!(parse_command("   ").is_none());
        assert!(parse_command(r#"{"command":"dance"}"#).unwrap().is_err());
        assert!(parse_command("not json").unwrap().is_err());
    }

    #[test]
    fn events_are_json_lines() {
        let mut buf = Vec::new();
        write_event(
            &mut buf,
            &SessionEvent::RecorderStart {
                sink: SinkId(2),
                mime_type: "audio/webm".into(),
            },
        )
        .unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["event"], "recorder_start");
        assert_eq!(value["data"]["sink"], 2);
        assert_eq!(value["data"]["mimeType"], "audio/webm");
    }

    #[tokio::test]
    async fn forwarded_events_keep_send_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(SessionEvent::Starting {}).unwrap();
        tx.send(SessionEvent::Ready {}).unwrap();
        tx.send(SessionEvent::Pong {}).unwrap();
        drop(tx);

        let mut buf = Vec::new();
        forward_events(rx, &mut buf).await;
        let names: Vec<String> = String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["event"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(names, vec!["starting", "ready", "pong"]);
    }

    #[test]
    fn saved_event_omits_missing_path() {
        let mut buf = Vec::new();
        write_event(
            &mut buf,
            &SessionEvent::RecordingSaved {
                filename: "take.webm".into(),
                path: None,
                bytes: 0,
                degraded: true,
            },
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["data"].get("path").is_none());
        assert_eq!(value["data"]["degraded"], true);
    }
}
