//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Various ways to parse MQTT integers
//!
//! All integers in MQTT are big-endian

use winnow::combinator::trace;
use winnow::token::take_while;
use winnow::Bytes;
use winnow::Parser;

use crate::error::MqttCodecError;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

pub const VARIABLE_INTEGER_MAX: u32 = 268_435_455;

pub fn parse_u8(input: &mut &Bytes) -> MResult<u8> {
    trace("parse_u8", winnow::binary::u8).parse_next(input)
}

#[inline]
pub fn write_u8<W: WriteMqttPacket>(buffer: &mut W, u: u8) -> WResult<W> {
    buffer.write_byte(u)
}

/// Parse a u16
///
/// MQTT expects their numbers in big-endian
#[doc = crate::util::md_speclink!("_Toc3901008")]
pub fn parse_u16(input: &mut &Bytes) -> MResult<u16> {
    trace("parse_u16", winnow::binary::be_u16).parse_next(input)
}

#[inline]
pub fn write_u16<W: WriteMqttPacket>(buffer: &mut W, u: u16) -> WResult<W> {
    buffer.write_u16(u)
}

/// Parse a u32
///
/// MQTT expects their numbers in big-endian
#[doc = crate::util::md_speclink!("_Toc3901009")]
pub fn parse_u32(input: &mut &Bytes) -> MResult<u32> {
    trace("parse_u32", winnow::binary::be_u32).parse_next(input)
}

#[inline]
pub fn write_u32<W: WriteMqttPacket>(buffer: &mut W, u: u32) -> WResult<W> {
    buffer.write_u32(u)
}

/// Parse a variable sized integer
///
/// Value range: `0..=268_435_455`
/// The maximal value is smaller than a u32, so that type is used
///
#[doc = crate::util::md_speclink!("_Toc3901011")]
pub fn parse_variable_u32(input: &mut &Bytes) -> MResult<u32> {
    trace("parse_variable_u32", |input: &mut &Bytes| {
        let var_bytes: MResult<(&[u8], u8)> = (
            take_while(0..=3, |b: u8| b & 0b1000_0000 != 0),
            winnow::binary::u8,
        )
            .parse_next(input);
        let (continued, last) = var_bytes?;

        if last & 0b1000_0000 != 0 {
            return Err(MqttCodecError::VarintOverflow);
        }

        // Only the shortest encoding of a value is valid
        if !continued.is_empty() && last == 0 {
            return Err(MqttCodecError::MalformedPacket(
                "variable byte integer is not minimally encoded",
            ));
        }

        let output = continued
            .iter()
            .chain(Some(&last))
            .enumerate()
            .fold(0u32, |acc, (exp, byte)| {
                acc + (u32::from(byte & 0b0111_1111) << (7 * exp))
            });

        Ok(output)
    })
    .parse_next(input)
}

/// Decode a variable sized integer at the start of a possibly incomplete buffer
///
/// Returns the value and the amount of bytes it occupied, or `None` if the buffer ends before
/// the last byte of the integer.
pub fn peek_variable_u32(bytes: &[u8]) -> MResult<Option<(u32, usize)>> {
    let mut input = Bytes::new(bytes);

    match parse_variable_u32(&mut input) {
        Ok(value) => Ok(Some((value, bytes.len() - input.len()))),
        Err(MqttCodecError::Truncated) => Ok(None),
        Err(error) => Err(error),
    }
}

pub fn write_variable_u32<W: WriteMqttPacket>(buffer: &mut W, u: u32) -> WResult<W> {
    match u {
        0..=127 => {
            buffer.write_byte(u as u8)?;
        }
        len @ 128..=16383 => {
            let first = (len % 128) | 0b1000_0000;
            let second = len / 128;
            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
        }
        len @ 16384..=2_097_151 => {
            let first = (len % 128) | 0b1000_0000;
            let second = ((len / 128) % 128) | 0b1000_0000;
            let third = len / (128 * 128);

            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
            buffer.write_byte(third as u8)?;
        }
        len @ 2_097_152..=VARIABLE_INTEGER_MAX => {
            let first = (len % 128) | 0b1000_0000;
            let second = ((len / 128) % 128) | 0b1000_0000;
            let third = ((len / (128 * 128)) % 128) | 0b1000_0000;
            let fourth = len / (128 * 128 * 128);

            buffer.write_byte(first as u8)?;
            buffer.write_byte(second as u8)?;
            buffer.write_byte(third as u8)?;
            buffer.write_byte(fourth as u8)?;
        }
        _size => {
            return Err(MqttCodecError::VarintOverflow.into());
        }
    }

    Ok(())
}
