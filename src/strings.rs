//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! UTF-8 strings and string pairs

use winnow::combinator::trace;
use winnow::Bytes;
use winnow::Parser;

use crate::binary::parse_slice;
use crate::error::MqttCodecError;
use crate::integers::parse_u16;
use crate::integers::write_u16;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// Control characters are not allowed anywhere in an MQTT string
fn is_forbidden_character(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

fn check_string(s: &str) -> MResult<()> {
    if s.contains(is_forbidden_character) {
        return Err(MqttCodecError::InvalidUtf8);
    }

    Ok(())
}

/// Parse an UTF-8 String
///
/// MQTT expects strings to be prefixed by their length as a two byte big-endian integer.
#[doc = crate::util::md_speclink!("_Toc3901010")]
pub fn parse_string<'i>(input: &mut &'i Bytes) -> MResult<&'i str> {
    trace("parse_string", |input: &mut &'i Bytes| {
        let len = parse_u16(input)?;
        let bytes = parse_slice(input, usize::from(len))?;

        let s = core::str::from_utf8(bytes).map_err(|_| MqttCodecError::InvalidUtf8)?;
        check_string(s)?;

        Ok(s)
    })
    .parse_next(input)
}

pub fn write_string<W: WriteMqttPacket>(buffer: &mut W, s: &str) -> WResult<W> {
    check_string(s)?;

    let len = u16::try_from(s.len())
        .map_err(|_| MqttCodecError::MalformedPacket("string is longer than 65535 bytes"))?;

    write_u16(buffer, len)?;
    buffer.write_slice(s.as_bytes())
}

/// Parse a pair of UTF-8 Strings
///
/// Used for user properties, where the first string is the key and the second the value.
#[doc = crate::util::md_speclink!("_Toc3901013")]
pub fn parse_string_pair<'i>(input: &mut &'i Bytes) -> MResult<(&'i str, &'i str)> {
    trace("parse_string_pair", (parse_string, parse_string)).parse_next(input)
}

pub fn write_string_pair<W: WriteMqttPacket>(buffer: &mut W, key: &str, value: &str) -> WResult<W> {
    write_string(buffer, key)?;
    write_string(buffer, value)
}
