#![forbid(unsafe_code)]

//! Streaming input decoder state machine.
//!
//! Turns a raw, arbitrarily-chunked terminal byte stream into
//! [`Event`](crate::event::Event) values. Handles:
//!
//! - ASCII characters and control codes
//! - UTF-8 multi-byte sequences
//! - CSI sequences (arrows, editing keys, function keys, reports)
//! - SS3 sequences (F1-F4 alternate encoding, application-mode arrows)
//! - OSC sequences (consumed, surfaced as `Unknown`)
//! - SGR and legacy X10 mouse reports
//! - Bracketed paste
//! - Focus events
//! - Kitty keyboard protocol
//!
//! # Design
//!
//! The decoder owns a byte buffer that only ever shrinks by *confirmed*
//! consumption: when the buffered bytes do not yet form a complete
//! sequence, every byte is retained for the next [`feed`](InputDecoder::feed).
//! Decoding is a pure function of `(buffer, mode)`, which makes the output
//! independent of how the stream was chunked: feeding a stream byte by
//! byte produces the same events as feeding it whole.
//!
//! A lone ESC is kept pending: it is indistinguishable from the start of a
//! longer sequence without a timer, and the decoder is purely byte-driven.
//! Embedders that want the usual tens-of-milliseconds disambiguation run
//! their own timeout and call [`flush`](InputDecoder::flush) when it fires.
//!
//! # Resource bounds
//!
//! A peer that starts a sequence and never finishes it would otherwise
//! grow the buffer without limit, so pending sequences are capped:
//! CSI at 256 bytes, OSC at 4 KiB, paste content at 1 MiB. Exceeding a cap
//! is treated as a protocol violation: the accumulated bytes are emitted
//! (never silently dropped) and the decoder resyncs to normal.

use crate::csi;
use crate::event::{Event, KeyCode, KeyEvent, Modifiers};

/// Pending cap: CSI sequence length.
pub(crate) const MAX_CSI_LEN: usize = 256;

/// Pending cap: OSC sequence length.
pub(crate) const MAX_OSC_LEN: usize = 4096;

/// Pending cap: paste content length.
pub(crate) const MAX_PASTE_LEN: usize = 1024 * 1024;

/// Bracketed paste end marker, `CSI 201 ~`.
const PASTE_END: &[u8] = b"\x1b[201~";

/// Compact the buffer once this many consumed bytes sit in front.
const COMPACT_AT: usize = 4096;

/// What the decoder is currently waiting on.
///
/// `Normal` is both the initial state and the state after every emitted
/// event. The escape-family states mean a prefix of that sequence type is
/// buffered; `Paste` persists until the end marker arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// No escape sequence pending (a partial UTF-8 scalar may be).
    #[default]
    Normal,
    /// A lone ESC is buffered.
    Escape,
    /// An unterminated `ESC [` sequence is buffered.
    Csi,
    /// An unterminated `ESC ]` sequence is buffered.
    Osc,
    /// `ESC O` is buffered, waiting for its one shifted byte.
    Ss3,
    /// Between the bracketed paste markers.
    Paste,
}

/// One decode attempt against the front of the buffer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// A complete span: emit the event, consume its bytes.
    Emit(Event, usize),
    /// `CSI 200 ~` resolved: consume it and switch to paste accumulation.
    EnterPaste(usize),
    /// Need more bytes; consume nothing and remember what we wait on.
    Incomplete(DecoderState),
}

/// Owned input buffer with confirmed-consumption semantics.
///
/// Bytes enter at the back via `extend` and leave only from the front via
/// `consume`. A front offset avoids shifting on every consume; the vector
/// is compacted when the dead prefix grows past [`COMPACT_AT`] or the
/// buffer empties.
#[derive(Debug, Default)]
struct RawBuffer {
    bytes: Vec<u8>,
    start: usize,
}

impl RawBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        if self.start >= COMPACT_AT {
            self.bytes.drain(..self.start);
            self.start = 0;
        }
        self.bytes.extend_from_slice(chunk);
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[self.start..]
    }

    fn consume(&mut self, n: usize) {
        self.start = (self.start + n).min(self.bytes.len());
        if self.start == self.bytes.len() {
            self.bytes.clear();
            self.start = 0;
        }
    }

    fn len(&self) -> usize {
        self.bytes.len() - self.start
    }

    fn is_empty(&self) -> bool {
        self.start == self.bytes.len()
    }

    fn clear(&mut self) {
        self.bytes.clear();
        self.start = 0;
    }
}

/// Streaming terminal input decoder.
///
/// One instance per input source, kept for the life of the session. Feed
/// it byte chunks of any size and split point:
///
/// ```
/// use vtinput::{Event, InputDecoder, KeyCode};
///
/// let mut decoder = InputDecoder::new();
/// let events = decoder.feed(b"\x1b[A");
/// assert_eq!(events.len(), 1);
/// assert!(matches!(&events[0], Event::Key(k) if k.code == KeyCode::Up));
///
/// // A sequence split across feeds is held until it completes.
/// assert!(decoder.feed(b"\x1b[1;5").is_empty());
/// let events = decoder.feed(b"B");
/// assert!(matches!(&events[0], Event::Key(k) if k.code == KeyCode::Down && k.ctrl()));
/// ```
///
/// The decoder performs no I/O and is not safe for concurrent feeding;
/// if the byte source runs on its own thread, serialize calls into it.
#[derive(Debug, Default)]
pub struct InputDecoder {
    buf: RawBuffer,
    state: DecoderState,
    paste: Vec<u8>,
}

impl InputDecoder {
    /// Create a decoder in the normal state with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append input bytes and decode every event they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Event> {
        self.buf.extend(bytes);
        let mut events = Vec::new();
        while let Some(event) = self.decode_next() {
            events.push(event);
        }
        events
    }

    /// Decode one event from the buffered bytes, if a complete span exists.
    ///
    /// Returns `None` when the buffer is empty or holds only the prefix of
    /// an unfinished sequence (in which case every byte is retained).
    pub fn decode_next(&mut self) -> Option<Event> {
        loop {
            if self.state == DecoderState::Paste {
                return self.drain_paste();
            }
            if self.buf.is_empty() {
                return None;
            }
            match scan(self.buf.as_slice()) {
                Step::Emit(event, n) => {
                    self.buf.consume(n);
                    self.state = DecoderState::Normal;
                    return Some(event);
                }
                Step::EnterPaste(n) => {
                    self.buf.consume(n);
                    self.paste.clear();
                    self.state = DecoderState::Paste;
                }
                Step::Incomplete(state) => {
                    self.state = state;
                    return None;
                }
            }
        }
    }

    /// Resolve whatever is pending without waiting for more bytes.
    ///
    /// This is the external-timeout hook: the decoder never guesses how
    /// long to wait for the rest of a sequence, so the embedder calls this
    /// after its own quiet period. A pending lone ESC becomes a real
    /// Escape keypress; any other partial sequence is emitted as
    /// [`Event::Unknown`]; an unterminated paste is closed and delivered.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::new();

        if self.state == DecoderState::Paste {
            self.paste.extend_from_slice(self.buf.as_slice());
            self.buf.clear();
            events.push(self.take_paste());
            self.state = DecoderState::Normal;
            return events;
        }

        if self.buf.is_empty() {
            return events;
        }

        let pending = self.buf.as_slice().to_vec();
        self.buf.clear();
        self.state = DecoderState::Normal;

        if pending.as_slice() == b"\x1b" {
            events.push(Event::Key(KeyEvent::new(KeyCode::Escape)));
        } else {
            events.push(Event::Unknown(pending));
        }
        events
    }

    /// The state the decoder is currently in.
    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Bytes currently retained (unconsumed input plus paste content).
    ///
    /// Useful for embedders that enforce their own backpressure policy on
    /// top of the built-in caps.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buf.len() + self.paste.len()
    }

    /// Accumulate paste content and look for the end marker.
    ///
    /// The marker may arrive split across any number of feeds, so the tail
    /// of the buffer that could still become `ESC [ 201 ~` stays in the
    /// buffer rather than moving into the paste.
    fn drain_paste(&mut self) -> Option<Event> {
        let buf = self.buf.as_slice();
        let budget = MAX_PASTE_LEN - self.paste.len();

        if let Some(idx) = find_paste_end(buf) {
            if idx <= budget {
                self.paste.extend_from_slice(&buf[..idx]);
                self.buf.consume(idx + PASTE_END.len());
                self.state = DecoderState::Normal;
                return Some(self.take_paste());
            }
        }

        let keep = partial_end_len(buf);
        let take = (buf.len() - keep).min(budget);
        self.paste.extend_from_slice(&buf[..take]);
        self.buf.consume(take);

        if self.paste.len() >= MAX_PASTE_LEN {
            #[cfg(feature = "tracing")]
            tracing::warn!(len = self.paste.len(), "paste exceeded cap, resyncing");
            self.state = DecoderState::Normal;
            return Some(self.take_paste());
        }

        None
    }

    fn take_paste(&mut self) -> Event {
        let text = String::from_utf8_lossy(&self.paste).into_owned();
        self.paste.clear();
        Event::Paste(text)
    }
}

/// Classify the lead byte and decode one span from the buffer front.
///
/// `buf` is non-empty. Pure: no state is read or written, so the result
/// depends only on the bytes, never on how they arrived.
fn scan(buf: &[u8]) -> Step {
    match buf[0] {
        0x1b => scan_escape(buf),
        0x20..=0x7e => Step::Emit(Event::Key(KeyEvent::new(KeyCode::Char(buf[0] as char))), 1),
        b if b < 0x20 || b == 0x7f => Step::Emit(Event::Key(control_key(b)), 1),
        _ => scan_utf8(buf),
    }
}

/// Route an ESC-prefixed buffer by its second byte.
fn scan_escape(buf: &[u8]) -> Step {
    if buf.len() == 1 {
        // A lone ESC keypress and the start of a longer sequence are the
        // same byte; only more input (or a flush) can tell them apart.
        return Step::Incomplete(DecoderState::Escape);
    }
    match buf[1] {
        b'[' => csi::scan_csi(buf),
        b']' => scan_osc(buf),
        b'O' => csi::scan_ss3(buf),
        // ESC + printable: the terminal's Alt+key encoding.
        0x20..=0x7e => {
            let key = KeyEvent::new(KeyCode::Char(buf[1] as char)).with_modifiers(Modifiers::ALT);
            Step::Emit(Event::Key(key), 2)
        }
        _ => Step::Emit(Event::Unknown(buf[..2].to_vec()), 2),
    }
}

/// Consume an OSC sequence terminated by BEL or ST (`ESC \`).
///
/// OSC payloads are terminal replies, not user input; the decoder consumes
/// them for framing and hands the raw bytes to the caller as `Unknown`.
fn scan_osc(buf: &[u8]) -> Step {
    let mut i = 2;
    while i < buf.len() {
        if i >= MAX_OSC_LEN {
            #[cfg(feature = "tracing")]
            tracing::warn!(len = i, "unterminated OSC sequence exceeded cap, resyncing");
            return Step::Emit(Event::Unknown(buf[..i].to_vec()), i);
        }
        match buf[i] {
            0x07 => return Step::Emit(Event::Unknown(buf[..=i].to_vec()), i + 1),
            0x1b => match buf.get(i + 1) {
                Some(b'\\') => return Step::Emit(Event::Unknown(buf[..i + 2].to_vec()), i + 2),
                // ESC inside the payload; keep collecting.
                Some(_) => i += 1,
                // Trailing ESC could be the start of ST.
                None => return Step::Incomplete(DecoderState::Osc),
            },
            _ => i += 1,
        }
    }
    Step::Incomplete(DecoderState::Osc)
}

/// Control bytes that double as named keys, plus the Ctrl+letter range.
fn control_key(byte: u8) -> KeyEvent {
    match byte {
        0x00 => KeyEvent::new(KeyCode::Char(' ')).with_modifiers(Modifiers::CTRL),
        0x08 => KeyEvent::new(KeyCode::Backspace),
        0x09 => KeyEvent::new(KeyCode::Tab),
        0x0a | 0x0d => KeyEvent::new(KeyCode::Enter),
        0x7f => KeyEvent::new(KeyCode::Delete),
        // 0x01-0x1a: Ctrl+A through Ctrl+Z; 0x1c-0x1f: Ctrl+\ ] ^ _
        _ => KeyEvent::new(KeyCode::Char((byte + 0x40) as char)).with_modifiers(Modifiers::CTRL),
    }
}

/// Decode one UTF-8 scalar from the buffer front.
fn scan_utf8(buf: &[u8]) -> Step {
    let expected = match buf[0] {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        // Bare continuation byte or an invalid lead.
        _ => return Step::Emit(Event::Unknown(vec![buf[0]]), 1),
    };

    // Reject a wrong continuation byte as soon as it arrives rather than
    // waiting for the full expected length.
    for (i, &b) in buf[1..buf.len().min(expected)].iter().enumerate() {
        if b & 0xc0 != 0x80 {
            return Step::Emit(Event::Unknown(buf[..=i].to_vec()), i + 1);
        }
    }

    if buf.len() < expected {
        return Step::Incomplete(DecoderState::Normal);
    }

    match std::str::from_utf8(&buf[..expected]) {
        Ok(s) => match s.chars().next() {
            Some(c) => Step::Emit(Event::Key(KeyEvent::new(KeyCode::Char(c))), expected),
            None => Step::Emit(Event::Unknown(buf[..expected].to_vec()), expected),
        },
        // Overlong encoding or a surrogate; reject the offending prefix.
        Err(e) => {
            let bad = e.error_len().unwrap_or(1).max(1);
            Step::Emit(Event::Unknown(buf[..bad].to_vec()), bad)
        }
    }
}

/// Position of the complete paste end marker, if buffered.
fn find_paste_end(buf: &[u8]) -> Option<usize> {
    buf.windows(PASTE_END.len()).position(|w| w == PASTE_END)
}

/// Length of the longest buffer suffix that is a proper prefix of the
/// paste end marker (0 to 5 bytes).
fn partial_end_len(buf: &[u8]) -> usize {
    let max = buf.len().min(PASTE_END.len() - 1);
    (1..=max)
        .rev()
        .find(|&k| buf[buf.len() - k..] == PASTE_END[..k])
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyEventKind, MouseButton, MouseEventKind};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> Event {
        Event::Key(KeyEvent::new(code).with_modifiers(modifiers))
    }

    #[test]
    fn printable_ascii() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"abc");
        assert_eq!(
            events,
            vec![
                key(KeyCode::Char('a')),
                key(KeyCode::Char('b')),
                key(KeyCode::Char('c')),
            ]
        );
    }

    #[test]
    fn ctrl_letters_are_uppercase() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(&[0x01]),
            vec![key_mod(KeyCode::Char('A'), Modifiers::CTRL)]
        );
        assert_eq!(
            decoder.feed(&[0x1a]),
            vec![key_mod(KeyCode::Char('Z'), Modifiers::CTRL)]
        );
    }

    #[test]
    fn named_control_bytes() {
        let mut decoder = InputDecoder::new();
        assert_eq!(decoder.feed(&[0x08]), vec![key(KeyCode::Backspace)]);
        assert_eq!(decoder.feed(&[0x09]), vec![key(KeyCode::Tab)]);
        assert_eq!(decoder.feed(&[0x0a]), vec![key(KeyCode::Enter)]);
        assert_eq!(decoder.feed(&[0x0d]), vec![key(KeyCode::Enter)]);
        assert_eq!(decoder.feed(&[0x7f]), vec![key(KeyCode::Delete)]);
    }

    #[test]
    fn ctrl_punctuation_range() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(&[0x1c]),
            vec![key_mod(KeyCode::Char('\\'), Modifiers::CTRL)]
        );
        assert_eq!(
            decoder.feed(&[0x1f]),
            vec![key_mod(KeyCode::Char('_'), Modifiers::CTRL)]
        );
    }

    #[test]
    fn lone_escape_stays_pending() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert_eq!(decoder.state(), DecoderState::Escape);
        assert_eq!(decoder.pending(), 1);

        // More bytes resolve it into a sequence.
        assert_eq!(decoder.feed(b"[A"), vec![key(KeyCode::Up)]);
        assert_eq!(decoder.state(), DecoderState::Normal);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn alt_key_synthesis() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1bx"),
            vec![key_mod(KeyCode::Char('x'), Modifiers::ALT)]
        );
    }

    #[test]
    fn esc_plus_control_byte_is_unknown() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1b\x01"),
            vec![Event::Unknown(vec![0x1b, 0x01])]
        );
        assert_eq!(
            decoder.feed(b"\x1b\x1b"),
            vec![Event::Unknown(vec![0x1b, 0x1b])]
        );
    }

    #[test]
    fn arrow_with_modifier_parameter() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1b[1;5A"),
            vec![key_mod(KeyCode::Up, Modifiers::CTRL)]
        );
    }

    #[test]
    fn sequence_split_at_every_boundary() {
        // The same stream fed byte by byte must yield the same events.
        let stream = b"a\x1b[1;5A\x1b[<0;5;10M\x1b[200~hi\x1b[201~\xc3\xa9\x1bOP";
        let mut whole = InputDecoder::new();
        let expected = whole.feed(stream);

        let mut split = InputDecoder::new();
        let mut actual = Vec::new();
        for &b in stream.iter() {
            actual.extend(split.feed(&[b]));
        }
        assert_eq!(actual, expected);
        assert_eq!(split.pending(), 0);
    }

    #[test]
    fn sgr_mouse_press() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[<0;5;10M");
        match &events[..] {
            [Event::Mouse(m)] => {
                assert_eq!(m.kind, MouseEventKind::Down(MouseButton::Left));
                assert_eq!(m.position(), (4, 9));
            }
            other => panic!("expected one mouse event, got {other:?}"),
        }
    }

    #[test]
    fn x10_mouse_press() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b[M").is_empty());
        let events = decoder.feed(b" !!");
        match &events[..] {
            [Event::Mouse(m)] => {
                assert_eq!(m.kind, MouseEventKind::Down(MouseButton::Left));
                assert_eq!(m.position(), (0, 0));
            }
            other => panic!("expected one mouse event, got {other:?}"),
        }
    }

    #[test]
    fn bracketed_paste_is_atomic() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[200~hello world\x1b[201~\x1b[A");
        assert_eq!(
            events,
            vec![Event::Paste("hello world".into()), key(KeyCode::Up)]
        );
    }

    #[test]
    fn paste_end_marker_split_across_feeds() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b[200~hi\x1b[20").is_empty());
        assert_eq!(decoder.state(), DecoderState::Paste);
        assert_eq!(decoder.feed(b"1~"), vec![Event::Paste("hi".into())]);
        assert_eq!(decoder.state(), DecoderState::Normal);
    }

    #[test]
    fn paste_content_is_not_reinterpreted() {
        // Escape-sequence-looking bytes inside a paste stay literal.
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[200~a\x1b[Ab\x1b[201~");
        assert_eq!(events, vec![Event::Paste("a\x1b[Ab".into())]);
    }

    #[test]
    fn empty_paste() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1b[200~\x1b[201~"),
            vec![Event::Paste(String::new())]
        );
    }

    #[test]
    fn utf8_split_across_feeds() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(&[0xc3]).is_empty());
        assert_eq!(decoder.feed(&[0xa9]), vec![key(KeyCode::Char('é'))]);

        // Four-byte scalar, one byte at a time.
        let mut events = Vec::new();
        for &b in "🦀".as_bytes() {
            events.extend(decoder.feed(&[b]));
        }
        assert_eq!(events, vec![key(KeyCode::Char('🦀'))]);
    }

    #[test]
    fn invalid_utf8_degrades_to_unknown() {
        let mut decoder = InputDecoder::new();
        // Bare continuation byte.
        assert_eq!(decoder.feed(&[0x80]), vec![Event::Unknown(vec![0x80])]);
        // Lead byte followed by a non-continuation byte; the good byte
        // afterwards still decodes.
        assert_eq!(
            decoder.feed(&[0xc3, b'x']),
            vec![Event::Unknown(vec![0xc3]), key(KeyCode::Char('x'))]
        );
    }

    #[test]
    fn focus_reports() {
        let mut decoder = InputDecoder::new();
        assert_eq!(decoder.feed(b"\x1b[I"), vec![Event::Focus(true)]);
        assert_eq!(decoder.feed(b"\x1b[O"), vec![Event::Focus(false)]);
    }

    #[test]
    fn resize_and_cursor_reports() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1b[8;24;80t"),
            vec![Event::Resize {
                width: 80,
                height: 24
            }]
        );
        assert_eq!(
            decoder.feed(b"\x1b[12;40R"),
            vec![Event::CursorReport { row: 12, col: 40 }]
        );
    }

    #[test]
    fn unmapped_final_byte_is_one_unknown() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1b[5Q"),
            vec![Event::Unknown(b"\x1b[5Q".to_vec())]
        );
        // The decoder resumes cleanly.
        assert_eq!(decoder.feed(b"\x1b[A"), vec![key(KeyCode::Up)]);
    }

    #[test]
    fn osc_sequences_are_consumed_whole() {
        let mut decoder = InputDecoder::new();
        assert_eq!(
            decoder.feed(b"\x1b]0;title\x07"),
            vec![Event::Unknown(b"\x1b]0;title\x07".to_vec())]
        );
        assert_eq!(
            decoder.feed(b"\x1b]52;c;aGk=\x1b\\"),
            vec![Event::Unknown(b"\x1b]52;c;aGk=\x1b\\".to_vec())]
        );
    }

    #[test]
    fn osc_split_before_st() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b]0;t").is_empty());
        assert_eq!(decoder.state(), DecoderState::Osc);
        // Trailing ESC might be the start of ST; still incomplete.
        assert!(decoder.feed(b"\x1b").is_empty());
        let events = decoder.feed(b"\\");
        assert_eq!(events, vec![Event::Unknown(b"\x1b]0;t\x1b\\".to_vec())]);
    }

    #[test]
    fn kitty_repeat_kind() {
        let mut decoder = InputDecoder::new();
        let events = decoder.feed(b"\x1b[97;5:2u");
        match &events[..] {
            [Event::Key(k)] => {
                assert_eq!(k.code, KeyCode::Char('a'));
                assert!(k.ctrl());
                assert_eq!(k.kind, KeyEventKind::Repeat);
            }
            other => panic!("expected one key event, got {other:?}"),
        }
    }

    #[test]
    fn flush_resolves_lone_escape() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert_eq!(decoder.flush(), vec![key(KeyCode::Escape)]);
        assert_eq!(decoder.state(), DecoderState::Normal);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn flush_reports_partial_sequence_as_unknown() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b[1;5").is_empty());
        assert_eq!(decoder.flush(), vec![Event::Unknown(b"\x1b[1;5".to_vec())]);
    }

    #[test]
    fn flush_closes_unterminated_paste() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.feed(b"\x1b[200~dangling").is_empty());
        assert_eq!(decoder.flush(), vec![Event::Paste("dangling".into())]);
    }

    #[test]
    fn flush_on_idle_decoder_is_empty() {
        let mut decoder = InputDecoder::new();
        assert!(decoder.flush().is_empty());
    }

    #[test]
    fn runaway_csi_resyncs_and_recovers() {
        let mut decoder = InputDecoder::new();
        let mut stream = b"\x1b[".to_vec();
        stream.extend(std::iter::repeat_n(b'0', MAX_CSI_LEN + 100));
        let events = decoder.feed(&stream);
        assert!(matches!(&events[0], Event::Unknown(raw) if raw.len() == MAX_CSI_LEN));
        // The overflow tail re-parses as ordinary printable input.
        assert!(events[1..].iter().all(|e| *e == key(KeyCode::Char('0'))));

        assert_eq!(decoder.feed(b"\x1b[A"), vec![key(KeyCode::Up)]);
    }

    #[test]
    fn oversized_paste_is_split_not_dropped() {
        let mut decoder = InputDecoder::new();
        decoder.feed(b"\x1b[200~");

        let chunk = vec![b'x'; MAX_PASTE_LEN + 10];
        let events = decoder.feed(&chunk);
        assert!(matches!(&events[0], Event::Paste(text) if text.len() == MAX_PASTE_LEN));
        // The resync happens at the cap, so the overflow tail re-parses as
        // ordinary printable input.
        assert_eq!(events.len(), 11);
        assert!(events[1..].iter().all(|e| *e == key(KeyCode::Char('x'))));
        assert_eq!(decoder.state(), DecoderState::Normal);
        let tail = decoder.feed(b"\x1b[201~");
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0], Event::Unknown(b"\x1b[201~".to_vec()));
    }

    #[test]
    fn no_panic_on_garbage() {
        let mut decoder = InputDecoder::new();
        let garbage = [0xff, 0xfe, 0x00, 0x1b, 0x1b, 0x1b, b'[', 0xff, b']', 0x00];
        let _ = decoder.feed(&garbage);
        let _ = decoder.flush();
        assert_eq!(decoder.feed(b"\x1b[A"), vec![key(KeyCode::Up)]);
    }

    #[test]
    fn raw_buffer_retains_until_consumed() {
        let mut buf = RawBuffer::default();
        buf.extend(b"abc");
        assert_eq!(buf.as_slice(), b"abc");
        buf.consume(1);
        assert_eq!(buf.as_slice(), b"bc");
        buf.extend(b"d");
        assert_eq!(buf.as_slice(), b"bcd");
        buf.consume(3);
        assert!(buf.is_empty());
        assert_eq!(buf.start, 0);
    }

    #[test]
    fn raw_buffer_compacts_dead_prefix() {
        let mut buf = RawBuffer::default();
        buf.extend(&vec![b'a'; COMPACT_AT + 8]);
        buf.consume(COMPACT_AT + 4);
        buf.extend(b"zz");
        assert_eq!(buf.start, 0);
        assert_eq!(buf.as_slice(), b"aaaazz");
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn partial_end_len_finds_longest_marker_prefix() {
        assert_eq!(partial_end_len(b"hello"), 0);
        assert_eq!(partial_end_len(b"hello\x1b"), 1);
        assert_eq!(partial_end_len(b"hello\x1b[20"), 4);
        assert_eq!(partial_end_len(b"hello\x1b[201"), 5);
        // A full marker is not a *partial* suffix; the caller finds it first.
        assert_eq!(partial_end_len(b"\x1b"), 1);
        assert_eq!(partial_end_len(b""), 0);
    }
}
