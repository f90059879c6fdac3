//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::combinator::trace;
use winnow::Bytes;
use winnow::Parser;

use crate::error::MqttCodecError;
use crate::integers::parse_u16;
use crate::integers::write_u16;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// Correlates a packet with its acknowledgement
///
/// Zero is not a valid identifier, which the type enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketIdentifier(pub core::num::NonZeroU16);

impl PacketIdentifier {
    pub fn new(id: u16) -> Option<Self> {
        core::num::NonZeroU16::new(id).map(PacketIdentifier)
    }

    #[inline]
    pub fn get(self) -> u16 {
        self.0.get()
    }

    #[doc = crate::util::md_speclink!("_Toc3901026")]
    pub fn parse(input: &mut &Bytes) -> MResult<Self> {
        trace(
            "PacketIdentifier",
            parse_u16.try_map(|id| {
                PacketIdentifier::new(id)
                    .ok_or(MqttCodecError::MalformedPacket("packet identifier must not be zero"))
            }),
        )
        .parse_next(input)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        write_u16(buffer, self.get())
    }
}

impl From<core::num::NonZeroU16> for PacketIdentifier {
    fn from(value: core::num::NonZeroU16) -> Self {
        PacketIdentifier(value)
    }
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use super::PacketIdentifier;
    use crate::error::MqttCodecError;

    #[test]
    fn check_packet_identifier() {
        let id = PacketIdentifier::parse(&mut Bytes::new(&[0x12u8, 0x34])).unwrap();
        assert_eq!(id.get(), 0x1234);

        let mut buffer = Vec::new();
        id.write(&mut buffer).unwrap();
        assert_eq!(buffer, [0x12, 0x34]);
    }

    #[test]
    fn check_zero_packet_identifier() {
        assert!(matches!(
            PacketIdentifier::parse(&mut Bytes::new(&[0x0u8, 0x0])),
            Err(MqttCodecError::MalformedPacket(_))
        ));
        assert_eq!(PacketIdentifier::new(0), None);
    }
}
