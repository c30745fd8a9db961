//! ALU operations for the 6809.
//!
//! Every function is pure: operands and the incoming CC in, result and the
//! new CC out. Flags an operation does not define are passed through.

use crate::flags::{Cc, C, H, N, V, Z};
use crate::opcodes::{Binary, Unary, WordOp};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult<T> {
    pub value: T,
    pub cc: Cc,
}

const fn result<T>(value: T, cc: Cc) -> AluResult<T> {
    AluResult { value, cc }
}

/// Add with optional carry in. Sets H, N, Z, V, C.
#[must_use]
pub fn add8(mut cc: Cc, a: u8, b: u8, carry: bool) -> AluResult<u8> {
    let sum = u16::from(a) + u16::from(b) + u16::from(carry);
    let r = sum as u8;
    cc.update_nz8(r);
    cc.set_if(H, (a ^ b ^ r) & 0x10 != 0);
    cc.set_if(V, (a ^ r) & (b ^ r) & 0x80 != 0);
    cc.set_if(C, sum & 0x100 != 0);
    result(r, cc)
}

/// Subtract with optional borrow in. Sets N, Z, V, C; H is left alone.
#[must_use]
pub fn sub8(mut cc: Cc, a: u8, b: u8, borrow: bool) -> AluResult<u8> {
    let diff = u16::from(a)
        .wrapping_sub(u16::from(b))
        .wrapping_sub(u16::from(borrow));
    let r = diff as u8;
    cc.update_nz8(r);
    cc.set_if(V, (a ^ b) & (a ^ r) & 0x80 != 0);
    cc.set_if(C, diff & 0x100 != 0);
    result(r, cc)
}

/// Flags for loads, stores and logic results: N, Z from the value, V clear.
#[must_use]
pub fn logic8(mut cc: Cc, value: u8) -> AluResult<u8> {
    cc.update_nz8(value);
    cc.clear(V);
    result(value, cc)
}

#[must_use]
pub fn logic16(mut cc: Cc, value: u16) -> AluResult<u16> {
    cc.update_nz16(value);
    cc.clear(V);
    result(value, cc)
}

/// Flags left behind by the illegal store-immediate opcodes: N forced on,
/// Z and V cleared, C untouched.
#[must_use]
pub fn discard(mut cc: Cc) -> Cc {
    cc.set(N);
    cc.clear(Z | V);
    cc
}

#[must_use]
pub fn add16(mut cc: Cc, a: u16, b: u16) -> AluResult<u16> {
    let sum = u32::from(a) + u32::from(b);
    let r = sum as u16;
    cc.update_nz16(r);
    cc.set_if(V, (a ^ r) & (b ^ r) & 0x8000 != 0);
    cc.set_if(C, sum & 0x1_0000 != 0);
    result(r, cc)
}

#[must_use]
pub fn sub16(mut cc: Cc, a: u16, b: u16) -> AluResult<u16> {
    let diff = u32::from(a).wrapping_sub(u32::from(b));
    let r = diff as u16;
    cc.update_nz16(r);
    cc.set_if(V, (a ^ b) & (a ^ r) & 0x8000 != 0);
    cc.set_if(C, diff & 0x1_0000 != 0);
    result(r, cc)
}

/// Accumulator operation `a <op> b`. CMP and BIT still return a value;
/// the caller drops it.
#[must_use]
pub fn binary(op: Binary, cc: Cc, a: u8, b: u8) -> AluResult<u8> {
    match op {
        Binary::Sub | Binary::Cmp => sub8(cc, a, b, false),
        Binary::Sbc => sub8(cc, a, b, cc.is_set(C)),
        Binary::And | Binary::Bit => logic8(cc, a & b),
        Binary::Ld => logic8(cc, b),
        Binary::Eor => logic8(cc, a ^ b),
        Binary::Adc => add8(cc, a, b, cc.is_set(C)),
        Binary::Or => logic8(cc, a | b),
        Binary::Add => add8(cc, a, b, false),
    }
}

#[must_use]
pub fn word(op: WordOp, cc: Cc, a: u16, b: u16) -> AluResult<u16> {
    match op {
        WordOp::Sub | WordOp::Cmp => sub16(cc, a, b),
        WordOp::Add => add16(cc, a, b),
    }
}

/// Read-modify-write operation on one byte.
#[must_use]
pub fn unary(op: Unary, mut cc: Cc, a: u8) -> AluResult<u8> {
    match op {
        Unary::Neg => sub8(cc, 0, a, false),
        Unary::XNc => {
            if cc.is_set(C) {
                unary(Unary::Com, cc, a)
            } else {
                sub8(cc, 0, a, false)
            }
        }
        Unary::Com => {
            let r = !a;
            cc.update_nz8(r);
            cc.clear(V);
            cc.set(C);
            result(r, cc)
        }
        Unary::Lsr => {
            let r = a >> 1;
            cc.clear(N);
            cc.set_if(Z, r == 0);
            cc.set_if(C, a & 0x01 != 0);
            result(r, cc)
        }
        Unary::Ror => {
            let r = (a >> 1) | if cc.is_set(C) { 0x80 } else { 0 };
            cc.update_nz8(r);
            cc.set_if(C, a & 0x01 != 0);
            result(r, cc)
        }
        Unary::Asr => {
            let r = (a >> 1) | (a & 0x80);
            cc.update_nz8(r);
            cc.set_if(C, a & 0x01 != 0);
            result(r, cc)
        }
        Unary::Asl => {
            let r = a << 1;
            cc.update_nz8(r);
            cc.set_if(V, (a ^ (a << 1)) & 0x80 != 0);
            cc.set_if(C, a & 0x80 != 0);
            result(r, cc)
        }
        Unary::Rol => {
            let r = (a << 1) | u8::from(cc.is_set(C));
            cc.update_nz8(r);
            cc.set_if(V, (a ^ (a << 1)) & 0x80 != 0);
            cc.set_if(C, a & 0x80 != 0);
            result(r, cc)
        }
        Unary::Dec => {
            let r = a.wrapping_sub(1);
            cc.update_nz8(r);
            cc.set_if(V, a == 0x80);
            result(r, cc)
        }
        Unary::XDec => {
            let r = a.wrapping_sub(1);
            cc.update_nz8(r);
            cc.set_if(V, a == 0x80);
            cc.set_if(C, a == 0);
            result(r, cc)
        }
        Unary::Inc => {
            let r = a.wrapping_add(1);
            cc.update_nz8(r);
            cc.set_if(V, a == 0x7F);
            result(r, cc)
        }
        Unary::Tst => logic8(cc, a),
        Unary::Clr => {
            cc.clear(N | V | C);
            cc.set(Z);
            result(0, cc)
        }
        Unary::XClr => {
            cc.clear(N | V);
            cc.set(Z);
            result(0, cc)
        }
    }
}

/// Unsigned 8x8 multiply. Z from the 16-bit product, C from bit 7 of the
/// low byte.
#[must_use]
pub fn mul(mut cc: Cc, a: u8, b: u8) -> AluResult<u16> {
    let r = u16::from(a) * u16::from(b);
    cc.set_if(Z, r == 0);
    cc.set_if(C, r & 0x80 != 0);
    result(r, cc)
}

/// Decimal adjust A after a BCD addition. C is only ever set, never
/// cleared.
#[must_use]
pub fn daa(mut cc: Cc, a: u8) -> AluResult<u8> {
    let low = a & 0x0F;
    let mut correction = 0u8;
    if low > 0x09 || cc.is_set(H) {
        correction |= 0x06;
    }
    if (a > 0x8F && low > 0x09) || a > 0x99 || cc.is_set(C) {
        correction |= 0x60;
    }
    let sum = u16::from(a) + u16::from(correction);
    let r = sum as u8;
    cc.update_nz8(r);
    cc.clear(V);
    if sum & 0x100 != 0 {
        cc.set(C);
    }
    result(r, cc)
}

/// Sign-extend B into A. N and Z from the full D.
#[must_use]
pub fn sex(mut cc: Cc, b: u8) -> AluResult<u16> {
    let r = if b & 0x80 != 0 { 0xFF00 | u16::from(b) } else { u16::from(b) };
    cc.update_nz16(r);
    result(r, cc)
}
