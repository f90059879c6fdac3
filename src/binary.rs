//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Length-prefixed binary data

use winnow::combinator::trace;
use winnow::Bytes;
use winnow::Parser;

use crate::error::MqttCodecError;
use crate::integers::parse_u16;
use crate::integers::write_u16;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// Take exactly `len` bytes off the front of the input
pub fn parse_slice<'i>(input: &mut &'i Bytes, len: usize) -> MResult<&'i [u8]> {
    trace("parse_slice", winnow::token::take(len)).parse_next(input)
}

/// Parse binary data
///
/// A two byte length followed by that many bytes, which are not interpreted.
#[doc = crate::util::md_speclink!("_Toc3901012")]
pub fn parse_binary_data<'i>(input: &mut &'i Bytes) -> MResult<&'i [u8]> {
    trace("parse_binary_data", |input: &mut &'i Bytes| {
        let len = parse_u16(input)?;
        parse_slice(input, usize::from(len))
    })
    .parse_next(input)
}

pub fn write_binary_data<W: WriteMqttPacket>(buffer: &mut W, data: &[u8]) -> WResult<W> {
    let len = u16::try_from(data.len())
        .map_err(|_| MqttCodecError::MalformedPacket("binary data is longer than 65535 bytes"))?;

    write_u16(buffer, len)?;
    buffer.write_slice(data)
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use super::parse_binary_data;
    use super::write_binary_data;
    use crate::error::MqttCodecError;

    #[test]
    fn check_binary_data() {
        let input = [0x0u8, 0x2, 0x4, 0x2];

        assert_eq!(
            parse_binary_data(&mut Bytes::new(&input)).unwrap(),
            &[0x4, 0x2]
        );
    }

    #[test]
    fn check_empty_binary_data() {
        let input = [0x0u8, 0x0];

        assert!(parse_binary_data(&mut Bytes::new(&input))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn check_short_binary_data() {
        let input = [0x0u8, 0x5, 0x1];

        assert!(matches!(
            parse_binary_data(&mut Bytes::new(&input)),
            Err(MqttCodecError::Truncated)
        ));
    }

    #[test]
    fn check_oversized_binary_data() {
        let data = vec![0u8; 65_536];
        let mut buffer = Vec::new();

        assert!(matches!(
            write_binary_data(&mut buffer, &data),
            Err(MqttCodecError::MalformedPacket(_))
        ));
    }
}
