//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! Blocking reading and writing of whole frames over [`std::io`]

use std::io::Read;
use std::io::Write;

use crate::error::MqttCodecError;
use crate::fixed_header::MFixedHeader;
use crate::integers::peek_variable_u32;
use crate::level::ProtocolVersion;
use crate::packets::MqttPacket;
use crate::MResult;

fn read_byte<R: Read>(source: &mut R) -> MResult<u8> {
    let mut byte = [0u8; 1];
    source.read_exact(&mut byte).map_err(map_read_error)?;
    Ok(byte[0])
}

fn map_read_error(error: std::io::Error) -> MqttCodecError {
    match error.kind() {
        std::io::ErrorKind::UnexpectedEof => MqttCodecError::Truncated,
        _ => MqttCodecError::Io(error),
    }
}

/// Read exactly one frame from `source` and decode it
///
/// Only the bytes belonging to the frame are consumed, so this can be called repeatedly on a
/// stream of packets. A source that ends within the frame yields [`MqttCodecError::Truncated`].
pub fn read_packet<R: Read>(source: &mut R, version: ProtocolVersion) -> MResult<MqttPacket> {
    let first = read_byte(source)?;
    let (kind, _) = MFixedHeader::split_first_byte(first)?;

    let mut frame = vec![first];
    let (remaining_length, _) = loop {
        frame.push(read_byte(source)?);

        if let Some(length) = peek_variable_u32(&frame[1..])? {
            break length;
        }
    };

    let header_length = frame.len();
    source
        .by_ref()
        .take(u64::from(remaining_length))
        .read_to_end(&mut frame)
        .map_err(map_read_error)?;

    if frame.len() - header_length < remaining_length as usize {
        return Err(MqttCodecError::Truncated);
    }

    tracing::trace!(%kind, remaining_length, "Read frame");

    MqttPacket::parse_complete(version, &frame)
}

/// Encode `packet` and write the whole frame to `sink`
///
/// Nothing is written if the packet fails to encode.
pub fn write_packet<W: Write>(sink: &mut W, packet: &MqttPacket) -> MResult<()> {
    let mut frame = Vec::new();
    packet.write(&mut frame)?;

    tracing::trace!(kind = %packet.kind(), length = frame.len(), "Writing frame");

    sink.write_all(&frame)?;
    Ok(())
}
