#![forbid(unsafe_code)]

//! Mouse report decoding, shared by the X10 and SGR wire formats.
//!
//! Both encodings pack the same information into one button integer:
//!
//! ```text
//! bit 0-1  base button (0=left, 1=middle, 2=right, 3=release/none)
//! bit 2    shift        (0x04)
//! bit 3    alt          (0x08)
//! bit 4    ctrl         (0x10)
//! bit 5    motion/drag  (0x20)
//! bit 6    wheel        (0x40, bits 0-1 then select the scroll direction)
//! bit 7    extended     (0x80, bits 0-1 then select buttons 8-11)
//! ```
//!
//! They differ only in transport: X10 sends three raw bytes biased by +32,
//! SGR sends decimal parameters and reports release via the `m` terminator.
//! [`classify`] is the single decode routine both entry points go through,
//! so the two paths cannot drift apart.

use crate::event::{Modifiers, MouseButton, MouseEvent, MouseEventKind};

const SHIFT: u16 = 0x04;
const ALT: u16 = 0x08;
const CTRL: u16 = 0x10;
const MOTION: u16 = 0x20;
const WHEEL: u16 = 0x40;
const EXTENDED: u16 = 0x80;

/// Decode an SGR mouse report (`CSI < btn ; x ; y M|m`).
///
/// `x` and `y` are the wire's 1-indexed coordinates; the event carries them
/// 0-indexed. The `m` terminator marks a release.
pub(crate) fn decode_sgr(btn: u16, x: u16, y: u16, final_byte: u8) -> MouseEvent {
    let (kind, modifiers) = classify(btn, final_byte == b'm');
    MouseEvent::new(kind, x.saturating_sub(1), y.saturating_sub(1)).with_modifiers(modifiers)
}

/// Decode a legacy X10 mouse report (`CSI M` followed by three raw bytes).
///
/// All three bytes carry a +32 bias; coordinates are additionally 1-indexed.
/// X10 reports a release as base button 3, so the released button's identity
/// is unknown.
pub(crate) fn decode_x10(raw: [u8; 3]) -> MouseEvent {
    let btn = u16::from(raw[0].saturating_sub(32));
    let x = u16::from(raw[1]).saturating_sub(33);
    let y = u16::from(raw[2]).saturating_sub(33);

    let release = btn & EXTENDED == 0 && btn & 0b11 == 3;
    let (kind, modifiers) = classify(btn, release);
    MouseEvent::new(kind, x, y).with_modifiers(modifiers)
}

/// Classify a button code into an event kind plus modifiers.
///
/// Priority: wheel, then motion, then release, then press. The `release`
/// flag is transport-specific (SGR: `m` terminator; X10: base button 3) and
/// is only consulted once wheel and motion are ruled out.
fn classify(btn: u16, release: bool) -> (MouseEventKind, Modifiers) {
    let mut modifiers = Modifiers::NONE;
    if btn & SHIFT != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if btn & ALT != 0 {
        modifiers |= Modifiers::ALT;
    }
    if btn & CTRL != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let kind = if btn & WHEEL != 0 {
        match btn & 0b11 {
            0 => MouseEventKind::ScrollUp,
            1 => MouseEventKind::ScrollDown,
            2 => MouseEventKind::ScrollLeft,
            _ => MouseEventKind::ScrollRight,
        }
    } else if btn & MOTION != 0 {
        if btn & 0b11 == 3 && btn & EXTENDED == 0 {
            MouseEventKind::Moved
        } else {
            MouseEventKind::Drag(button(btn))
        }
    } else if release {
        MouseEventKind::Up(button(btn))
    } else {
        MouseEventKind::Down(button(btn))
    };

    (kind, modifiers)
}

fn button(btn: u16) -> MouseButton {
    if btn & EXTENDED != 0 {
        return MouseButton::Other(8 + (btn & 0b11) as u8);
    }
    match btn & 0b11 {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        // X10 release does not identify the button
        _ => MouseButton::Left,
    }
}
