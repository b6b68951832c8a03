#![forbid(unsafe_code)]

//! Streaming terminal input decoder.
//!
//! `vtinput` turns the raw byte stream a terminal delivers in raw mode
//! (keystrokes, mouse reports, focus notifications, pasted text) into
//! discrete [`Event`] values. It is the layer between a `read()` loop and
//! an application's event loop: the caller owns the file descriptor and
//! the terminal modes; the decoder owns the hard part, a state machine
//! that survives escape sequences split across arbitrary read boundaries
//! without stalling or losing bytes.
//!
//! ```
//! use vtinput::{Event, InputDecoder, KeyCode};
//!
//! let mut decoder = InputDecoder::new();
//!
//! // Chunk boundaries don't matter: this arrives in two reads.
//! let mut events = decoder.feed(b"\x1b[2");
//! events.extend(decoder.feed(b"00~pasted\x1b[201~q"));
//!
//! assert_eq!(events.len(), 2);
//! assert!(matches!(&events[0], Event::Paste(text) if text == "pasted"));
//! assert!(matches!(&events[1], Event::Key(k) if k.code == KeyCode::Char('q')));
//! ```
//!
//! Malformed input is never fatal: unrecognized sequences come back as
//! [`Event::Unknown`] with the raw bytes, and decoding resumes at the next
//! byte. See [`InputDecoder::flush`] for lone-ESC disambiguation.

pub mod decoder;
pub mod event;

mod csi;
mod mouse;

pub use decoder::{DecoderState, InputDecoder};
pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
