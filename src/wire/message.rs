//! Event messages and their framing
//!
//! Client-originated forms omit the sender identity; the
//! server-relayed forms carry `client_id` and `username` as two
//! trailing strings. `changeTool` exists only in client form: the
//! hub consumes it and never relays it as binary. `sessionUpdate`
//! (tag 6) is reserved for the JSON directory snapshot and is never
//! produced by this codec.

use super::{WireError, WireReader, WireResult, WireWriter};

/// Message kind tags (the leading wire byte)
pub mod tag {
    pub const CHANGE_TOOL: u8 = 1;
    pub const TEXT: u8 = 2;
    pub const WRITE_FILE: u8 = 3;
    pub const PALETTE_IMAGE_UPLOAD: u8 = 4;
    pub const CURSOR_UPDATE: u8 = 5;
    pub const SESSION_UPDATE: u8 = 6;
}

/// Read only the leading tag byte of a frame.
pub fn peek_tag(frame: &[u8]) -> WireResult<u8> {
    WireReader::new(frame).read_u8()
}

/// Re-frame a relayed event: the original bytes plus the sender's
/// connection id and username as two trailing length-prefixed
/// strings. The payload itself is not decoded.
pub fn append_sender(frame: &[u8], client_id: &str, username: &str) -> WireResult<Vec<u8>> {
    let size =
        frame.len() + WireWriter::string_size(client_id) + WireWriter::string_size(username);
    let mut w = WireWriter::with_capacity(size);
    w.write_raw(frame);
    w.write_string(client_id)?;
    w.write_string(username)?;
    Ok(w.into_bytes())
}

/// An event as sent by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Sender switched drawing tool; consumed by the hub, not relayed
    ChangeTool { tool_name: String },
    Text { text: String },
    WriteFile { path: String, content: String },
    PaletteImageUpload { path: String, version_id: String },
    /// `tool` empty means "none"
    CursorUpdate { tool: String, x: f32, y: f32 },
}

impl ClientEvent {
    pub fn kind_tag(&self) -> u8 {
        match self {
            ClientEvent::ChangeTool { .. } => tag::CHANGE_TOOL,
            ClientEvent::Text { .. } => tag::TEXT,
            ClientEvent::WriteFile { .. } => tag::WRITE_FILE,
            ClientEvent::PaletteImageUpload { .. } => tag::PALETTE_IMAGE_UPLOAD,
            ClientEvent::CursorUpdate { .. } => tag::CURSOR_UPDATE,
        }
    }

    fn encoded_size(&self) -> usize {
        let fields = match self {
            ClientEvent::ChangeTool { tool_name } => WireWriter::string_size(tool_name),
            ClientEvent::Text { text } => WireWriter::string_size(text),
            ClientEvent::WriteFile { path, content } => {
                WireWriter::string_size(path) + WireWriter::string_size(content)
            }
            ClientEvent::PaletteImageUpload { path, version_id } => {
                WireWriter::string_size(path) + WireWriter::string_size(version_id)
            }
            ClientEvent::CursorUpdate { tool, .. } => WireWriter::string_size(tool) + 4 + 4,
        };
        1 + fields
    }

    pub fn encode(&self) -> WireResult<Vec<u8>> {
        let mut w = WireWriter::with_capacity(self.encoded_size());
        w.write_u8(self.kind_tag());
        match self {
            ClientEvent::ChangeTool { tool_name } => {
                w.write_string(tool_name)?;
            }
            ClientEvent::Text { text } => {
                w.write_string(text)?;
            }
            ClientEvent::WriteFile { path, content } => {
                w.write_string(path)?;
                w.write_string(content)?;
            }
            ClientEvent::PaletteImageUpload { path, version_id } => {
                w.write_string(path)?;
                w.write_string(version_id)?;
            }
            ClientEvent::CursorUpdate { tool, x, y } => {
                w.write_string(tool)?;
                w.write_f32(*x);
                w.write_f32(*y);
            }
        }
        Ok(w.into_bytes())
    }

    pub fn decode(frame: &[u8]) -> WireResult<Self> {
        let mut r = WireReader::new(frame);
        match r.read_u8()? {
            tag::CHANGE_TOOL => Ok(ClientEvent::ChangeTool {
                tool_name: r.read_string()?,
            }),
            tag::TEXT => Ok(ClientEvent::Text {
                text: r.read_string()?,
            }),
            tag::WRITE_FILE => Ok(ClientEvent::WriteFile {
                path: r.read_string()?,
                content: r.read_string()?,
            }),
            tag::PALETTE_IMAGE_UPLOAD => Ok(ClientEvent::PaletteImageUpload {
                path: r.read_string()?,
                version_id: r.read_string()?,
            }),
            tag::CURSOR_UPDATE => Ok(ClientEvent::CursorUpdate {
                tool: r.read_string()?,
                x: r.read_f32()?,
                y: r.read_f32()?,
            }),
            other => Err(WireError::UnknownKind(other)),
        }
    }
}

/// An event as relayed by the server, sender identity appended.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Text {
        text: String,
        client_id: String,
        username: String,
    },
    WriteFile {
        path: String,
        content: String,
        client_id: String,
        username: String,
    },
    PaletteImageUpload {
        path: String,
        version_id: String,
        client_id: String,
        username: String,
    },
    CursorUpdate {
        tool: String,
        x: f32,
        y: f32,
        client_id: String,
        username: String,
    },
}

impl ServerEvent {
    pub fn kind_tag(&self) -> u8 {
        match self {
            ServerEvent::Text { .. } => tag::TEXT,
            ServerEvent::WriteFile { .. } => tag::WRITE_FILE,
            ServerEvent::PaletteImageUpload { .. } => tag::PALETTE_IMAGE_UPLOAD,
            ServerEvent::CursorUpdate { .. } => tag::CURSOR_UPDATE,
        }
    }

    fn encoded_size(&self) -> usize {
        let fields = match self {
            ServerEvent::Text {
                text,
                client_id,
                username,
            } => {
                WireWriter::string_size(text)
                    + WireWriter::string_size(client_id)
                    + WireWriter::string_size(username)
            }
            ServerEvent::WriteFile {
                path,
                content,
                client_id,
                username,
            } => {
                WireWriter::string_size(path)
                    + WireWriter::string_size(content)
                    + WireWriter::string_size(client_id)
                    + WireWriter::string_size(username)
            }
            ServerEvent::PaletteImageUpload {
                path,
                version_id,
                client_id,
                username,
            } => {
                WireWriter::string_size(path)
                    + WireWriter::string_size(version_id)
                    + WireWriter::string_size(client_id)
                    + WireWriter::string_size(username)
            }
            ServerEvent::CursorUpdate {
                tool,
                client_id,
                username,
                ..
            } => {
                WireWriter::string_size(tool)
                    + 4
                    + 4
                    + WireWriter::string_size(client_id)
                    + WireWriter::string_size(username)
            }
        };
        1 + fields
    }

    pub fn encode(&self) -> WireResult<Vec<u8>> {
        let mut w = WireWriter::with_capacity(self.encoded_size());
        w.write_u8(self.kind_tag());
        match self {
            ServerEvent::Text {
                text,
                client_id,
                username,
            } => {
                w.write_string(text)?;
                w.write_string(client_id)?;
                w.write_string(username)?;
            }
            ServerEvent::WriteFile {
                path,
                content,
                client_id,
                username,
            } => {
                w.write_string(path)?;
                w.write_string(content)?;
                w.write_string(client_id)?;
                w.write_string(username)?;
            }
            ServerEvent::PaletteImageUpload {
                path,
                version_id,
                client_id,
                username,
            } => {
                w.write_string(path)?;
                w.write_string(version_id)?;
                w.write_string(client_id)?;
                w.write_string(username)?;
            }
            ServerEvent::CursorUpdate {
                tool,
                x,
                y,
                client_id,
                username,
            } => {
                w.write_string(tool)?;
                w.write_f32(*x);
                w.write_f32(*y);
                w.write_string(client_id)?;
                w.write_string(username)?;
            }
        }
        Ok(w.into_bytes())
    }

    pub fn decode(frame: &[u8]) -> WireResult<Self> {
        let mut r = WireReader::new(frame);
        match r.read_u8()? {
            tag::TEXT => Ok(ServerEvent::Text {
                text: r.read_string()?,
                client_id: r.read_string()?,
                username: r.read_string()?,
            }),
            tag::WRITE_FILE => Ok(ServerEvent::WriteFile {
                path: r.read_string()?,
                content: r.read_string()?,
                client_id: r.read_string()?,
                username: r.read_string()?,
            }),
            tag::PALETTE_IMAGE_UPLOAD => Ok(ServerEvent::PaletteImageUpload {
                path: r.read_string()?,
                version_id: r.read_string()?,
                client_id: r.read_string()?,
                username: r.read_string()?,
            }),
            tag::CURSOR_UPDATE => Ok(ServerEvent::CursorUpdate {
                tool: r.read_string()?,
                x: r.read_f32()?,
                y: r.read_f32()?,
                client_id: r.read_string()?,
                username: r.read_string()?,
            }),
            other => Err(WireError::UnknownKind(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_samples() -> Vec<ClientEvent> {
        vec![
            ClientEvent::ChangeTool {
                tool_name: "brush".into(),
            },
            ClientEvent::Text {
                text: "hello room".into(),
            },
            ClientEvent::WriteFile {
                path: "sketches/a.svg".into(),
                content: "<svg/>".into(),
            },
            ClientEvent::PaletteImageUpload {
                path: "palette/p.png".into(),
                version_id: "v42".into(),
            },
            ClientEvent::CursorUpdate {
                tool: "pen".into(),
                x: 12.5,
                y: -3.25,
            },
        ]
    }

    #[test]
    fn test_client_round_trip_all_kinds() {
        for event in client_samples() {
            let encoded = event.encode().unwrap();
            let decoded = ClientEvent::decode(&encoded).unwrap();
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn test_client_round_trip_edge_cases() {
        let events = vec![
            ClientEvent::ChangeTool {
                tool_name: "".into(),
            },
            ClientEvent::Text { text: "".into() },
            ClientEvent::WriteFile {
                path: "".into(),
                content: "".into(),
            },
            ClientEvent::CursorUpdate {
                tool: "".into(),
                x: 0.0,
                y: 0.0,
            },
        ];
        for event in events {
            let encoded = event.encode().unwrap();
            assert_eq!(ClientEvent::decode(&encoded).unwrap(), event);
        }
    }

    #[test]
    fn test_text_frame_layout() {
        let frame = ClientEvent::Text { text: "hi".into() }.encode().unwrap();
        assert_eq!(frame, vec![tag::TEXT, 2, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn test_encode_capacity_is_exact() {
        for event in client_samples() {
            let frame = event.encode().unwrap();
            assert_eq!(frame.len(), frame.capacity());
        }
    }

    #[test]
    fn test_multibyte_string_length_is_bytes() {
        let frame = ClientEvent::Text { text: "é".into() }.encode().unwrap();
        // 'é' encodes to two bytes; the prefix counts bytes, not chars
        assert_eq!(frame[1..5], [2, 0, 0, 0]);
        assert_eq!(ClientEvent::decode(&frame).unwrap(), ClientEvent::Text { text: "é".into() });
    }

    #[test]
    fn test_decode_unknown_tag() {
        assert!(matches!(
            ClientEvent::decode(&[99]).unwrap_err(),
            WireError::UnknownKind(99)
        ));
    }

    #[test]
    fn test_decode_empty_buffer() {
        assert!(matches!(
            ClientEvent::decode(&[]).unwrap_err(),
            WireError::Truncated { .. }
        ));
    }

    #[test]
    fn test_truncation_every_kind() {
        for event in client_samples() {
            let full = event.encode().unwrap();
            for cut in 0..full.len() {
                let result = ClientEvent::decode(&full[..cut]);
                assert!(
                    result.is_err(),
                    "decode of {} byte prefix should fail for {:?}",
                    cut,
                    event
                );
            }
        }
    }

    #[test]
    fn test_server_round_trip_all_kinds() {
        let events = vec![
            ServerEvent::Text {
                text: "hey".into(),
                client_id: "c1".into(),
                username: "alice".into(),
            },
            ServerEvent::WriteFile {
                path: "a.txt".into(),
                content: "body".into(),
                client_id: "c2".into(),
                username: "bob".into(),
            },
            ServerEvent::PaletteImageUpload {
                path: "p.png".into(),
                version_id: "v1".into(),
                client_id: "c3".into(),
                username: "carol".into(),
            },
            ServerEvent::CursorUpdate {
                tool: "".into(),
                x: 0.0,
                y: 640.25,
                client_id: "c4".into(),
                username: "dave".into(),
            },
        ];
        for event in events {
            let encoded = event.encode().unwrap();
            assert_eq!(ServerEvent::decode(&encoded).unwrap(), event);
        }
    }

    #[test]
    fn test_server_decode_rejects_change_tool_tag() {
        // changeTool is never relayed as binary
        let frame = ClientEvent::ChangeTool {
            tool_name: "pen".into(),
        }
        .encode()
        .unwrap();
        assert!(matches!(
            ServerEvent::decode(&frame).unwrap_err(),
            WireError::UnknownKind(t) if t == tag::CHANGE_TOOL
        ));
    }

    #[test]
    fn test_append_sender_is_original_plus_two_strings() {
        let original = ClientEvent::Text {
            text: "hello".into(),
        }
        .encode()
        .unwrap();
        let relayed = append_sender(&original, "c1", "alice").unwrap();

        assert_eq!(&relayed[..original.len()], &original[..]);
        let mut expected_tail = vec![2, 0, 0, 0, b'c', b'1', 5, 0, 0, 0];
        expected_tail.extend_from_slice(b"alice");
        assert_eq!(&relayed[original.len()..], &expected_tail[..]);
    }

    #[test]
    fn test_append_sender_decodes_as_server_event() {
        let original = ClientEvent::CursorUpdate {
            tool: "pen".into(),
            x: 1.0,
            y: 2.0,
        }
        .encode()
        .unwrap();
        let relayed = append_sender(&original, "conn-9", "bob").unwrap();

        assert_eq!(
            ServerEvent::decode(&relayed).unwrap(),
            ServerEvent::CursorUpdate {
                tool: "pen".into(),
                x: 1.0,
                y: 2.0,
                client_id: "conn-9".into(),
                username: "bob".into(),
            }
        );
    }

    #[test]
    fn test_peek_tag() {
        let frame = ClientEvent::Text { text: "x".into() }.encode().unwrap();
        assert_eq!(peek_tag(&frame).unwrap(), tag::TEXT);
        assert!(matches!(
            peek_tag(&[]).unwrap_err(),
            WireError::Truncated { .. }
        ));
    }
}
