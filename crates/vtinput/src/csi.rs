#![forbid(unsafe_code)]

//! CSI and SS3 sequence parsing.
//!
//! A CSI sequence is `ESC [`, a run of parameter/intermediate bytes
//! (`0x20-0x3F`), and one final byte (`0x40-0x7E`). The final byte selects
//! the interpretation; parameters are `;`-separated decimal integers with
//! kitty-style `:` subfields inside one parameter.
//!
//! Two wire quirks live here:
//!
//! - Legacy X10 mouse reports are `ESC [ M` followed by three *raw payload
//!   bytes* that are not parameter bytes at all. The generic scanner must
//!   not run over them, so `M` directly after the introducer is special.
//! - SGR mouse reports prefix their parameters with `<` and distinguish
//!   press from release via the final byte's case (`M`/`m`).
//!
//! Tilde keys use the canonical xterm/VT220 numbering: 11-15 are F1-F5,
//! 17-21 are F6-F10, 23/24 are F11/F12. The unassigned codes 16 and 22
//! surface as [`Event::Unknown`].

use crate::decoder::{DecoderState, MAX_CSI_LEN, Step};
use crate::event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
use crate::mouse;

/// Scan a buffer beginning with `ESC [` for one complete CSI sequence.
pub(crate) fn scan_csi(buf: &[u8]) -> Step {
    debug_assert!(buf.starts_with(b"\x1b["));

    if buf.len() == 2 {
        return Step::Incomplete(DecoderState::Csi);
    }

    // X10 mouse: `M` with no parameters, then a fixed three-byte payload.
    if buf[2] == b'M' {
        if buf.len() < 6 {
            return Step::Incomplete(DecoderState::Csi);
        }
        let event = mouse::decode_x10([buf[3], buf[4], buf[5]]);
        return Step::Emit(Event::Mouse(event), 6);
    }

    let mut i = 2;
    while i < buf.len() {
        if i >= MAX_CSI_LEN {
            #[cfg(feature = "tracing")]
            tracing::warn!(len = i, "unterminated CSI sequence exceeded cap, resyncing");
            return Step::Emit(Event::Unknown(buf[..i].to_vec()), i);
        }
        match buf[i] {
            // Final byte: the sequence is complete.
            0x40..=0x7E => return dispatch(&buf[2..i], buf[i], &buf[..=i]),
            // Parameter and intermediate bytes.
            0x20..=0x3F => i += 1,
            // Anything else aborts the sequence, bad byte included.
            _ => return Step::Emit(Event::Unknown(buf[..=i].to_vec()), i + 1),
        }
    }

    Step::Incomplete(DecoderState::Csi)
}

/// Scan a buffer beginning with `ESC O` for one SS3 sequence.
///
/// SS3 shifts exactly one following byte: F1-F4 from most terminals, plus
/// Home/End and application-cursor-mode arrows.
pub(crate) fn scan_ss3(buf: &[u8]) -> Step {
    debug_assert!(buf.starts_with(b"\x1bO"));

    if buf.len() < 3 {
        return Step::Incomplete(DecoderState::Ss3);
    }

    let code = match buf[2] {
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Step::Emit(Event::Unknown(buf[..3].to_vec()), 3),
    };

    Step::Emit(Event::Key(KeyEvent::new(code)), 3)
}

/// Dispatch one complete CSI sequence by its final byte.
///
/// `params` is the span between the introducer and the final byte; `raw`
/// is the whole sequence (for `Unknown` reporting and the consumed count).
fn dispatch(params: &[u8], final_byte: u8, raw: &[u8]) -> Step {
    let consumed = raw.len();

    // SGR mouse: `<` prefix, `M` press/drag or `m` release.
    if let Some(rest) = params.strip_prefix(b"<") {
        if final_byte == b'M' || final_byte == b'm' {
            let event = mouse::decode_sgr(
                param_u16(rest, 0),
                param_u16(rest, 1),
                param_u16(rest, 2),
                final_byte,
            );
            return Step::Emit(Event::Mouse(event), consumed);
        }
        return Step::Emit(Event::Unknown(raw.to_vec()), consumed);
    }

    match final_byte {
        b'A' => modified_key(KeyCode::Up, params, consumed),
        b'B' => modified_key(KeyCode::Down, params, consumed),
        b'C' => modified_key(KeyCode::Right, params, consumed),
        b'D' => modified_key(KeyCode::Left, params, consumed),
        b'H' => modified_key(KeyCode::Home, params, consumed),
        b'F' => modified_key(KeyCode::End, params, consumed),
        b'Z' => Step::Emit(
            Event::Key(KeyEvent::new(KeyCode::BackTab).with_modifiers(Modifiers::SHIFT)),
            consumed,
        ),
        b'~' => tilde(params, raw),
        b'u' => kitty(params, raw),
        b't' if param_u16(params, 0) == 8 => Step::Emit(
            Event::Resize {
                width: param_u16(params, 2),
                height: param_u16(params, 1),
            },
            consumed,
        ),
        b'R' => Step::Emit(
            Event::CursorReport {
                row: param_u16(params, 0),
                col: param_u16(params, 1),
            },
            consumed,
        ),
        b'I' if params.is_empty() => Step::Emit(Event::Focus(true), consumed),
        b'O' if params.is_empty() => Step::Emit(Event::Focus(false), consumed),
        _ => Step::Emit(Event::Unknown(raw.to_vec()), consumed),
    }
}

/// A key whose optional second parameter carries xterm-encoded modifiers.
fn modified_key(code: KeyCode, params: &[u8], consumed: usize) -> Step {
    let modifiers = modifiers_from_param(param_u32(params, 1));
    Step::Emit(
        Event::Key(KeyEvent::new(code).with_modifiers(modifiers)),
        consumed,
    )
}

/// CSI sequences ending in `~`: editing/navigation keys, function keys,
/// and the bracketed paste delimiters.
fn tilde(params: &[u8], raw: &[u8]) -> Step {
    let consumed = raw.len();
    let num = param_u16(params, 0);

    if num == 200 {
        return Step::EnterPaste(consumed);
    }

    let code = match num {
        1 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((num - 10) as u8),
        17..=21 => KeyCode::F((num - 11) as u8),
        23 | 24 => KeyCode::F((num - 12) as u8),
        // 201 outside paste mode is a stray end marker; 16, 22, and the
        // rest have no assignment.
        _ => return Step::Emit(Event::Unknown(raw.to_vec()), consumed),
    };

    let modifiers = modifiers_from_param(param_u32(params, 1));
    Step::Emit(
        Event::Key(KeyEvent::new(code).with_modifiers(modifiers)),
        consumed,
    )
}

/// Kitty keyboard protocol: `CSI codepoint[:...] ; mods[:event] [; text] u`.
fn kitty(params: &[u8], raw: &[u8]) -> Step {
    let consumed = raw.len();

    let Some(code_point) = leading_int(subfield(field(params, 0), 0)) else {
        return Step::Emit(Event::Unknown(raw.to_vec()), consumed);
    };
    let Some(code) = kitty_keycode(code_point) else {
        return Step::Emit(Event::Unknown(raw.to_vec()), consumed);
    };

    let mod_field = field(params, 1);
    let modifiers = modifiers_from_param(leading_int(subfield(mod_field, 0)).unwrap_or(1));
    let kind = match leading_int(subfield(mod_field, 1)).unwrap_or(1) {
        2 => KeyEventKind::Repeat,
        3 => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    };

    Step::Emit(
        Event::Key(KeyEvent::new(code).with_modifiers(modifiers).with_kind(kind)),
        consumed,
    )
}

fn kitty_keycode(code_point: u32) -> Option<KeyCode> {
    match code_point {
        9 => Some(KeyCode::Tab),
        13 => Some(KeyCode::Enter),
        27 => Some(KeyCode::Escape),
        8 | 127 => Some(KeyCode::Backspace),
        // Functional keycodes from the kitty private-use block.
        57_344 => Some(KeyCode::Escape),
        57_345 => Some(KeyCode::Enter),
        57_346 => Some(KeyCode::Tab),
        57_347 => Some(KeyCode::Backspace),
        57_348 => Some(KeyCode::Insert),
        57_349 => Some(KeyCode::Delete),
        57_350 => Some(KeyCode::Left),
        57_351 => Some(KeyCode::Right),
        57_352 => Some(KeyCode::Up),
        57_353 => Some(KeyCode::Down),
        57_354 => Some(KeyCode::PageUp),
        57_355 => Some(KeyCode::PageDown),
        57_356 => Some(KeyCode::Home),
        57_357 => Some(KeyCode::End),
        57_364..=57_387 => Some(KeyCode::F((code_point - 57_364 + 1) as u8)),
        // Remaining private-use codes (keypad, media, modifiers) are not mapped.
        57_358..=57_363 | 57_388..=63_743 => None,
        _ => char::from_u32(code_point).map(KeyCode::Char),
    }
}

/// Decode an xterm modifier parameter (`param = 1 + bitmask`).
///
/// The bitmask matches [`Modifiers`] bit for bit, through META.
fn modifiers_from_param(value: u32) -> Modifiers {
    let bits = value.saturating_sub(1);
    Modifiers::from_bits_truncate((bits & 0x3F) as u8)
}

/// The `idx`-th `;`-separated parameter, or an empty slice.
fn field(params: &[u8], idx: usize) -> &[u8] {
    params.split(|&b| b == b';').nth(idx).unwrap_or(b"")
}

/// The `idx`-th `:`-separated subfield of one parameter.
fn subfield(param: &[u8], idx: usize) -> &[u8] {
    param.split(|&b| b == b':').nth(idx).unwrap_or(b"")
}

/// Parse the leading decimal digits of a field; `None` if there are none.
fn leading_int(field: &[u8]) -> Option<u32> {
    let digits = field.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let mut value: u32 = 0;
    for &b in &field[..digits] {
        value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    Some(value)
}

fn param_u16(params: &[u8], idx: usize) -> u16 {
    param_u32(params, idx).min(u32::from(u16::MAX)) as u16
}

/// The `idx`-th parameter as an integer; empty or unparseable fields are 0.
fn param_u32(params: &[u8], idx: usize) -> u32 {
    leading_int(field(params, idx)).unwrap_or(0)
}
