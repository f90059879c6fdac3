//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::integers::parse_u8;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// The protocol level announced in CONNECT, which fixes the wire format of a whole connection
#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum ProtocolVersion {
    V3_1_1 = 4,
    V5 = 5,
}

impl ProtocolVersion {
    #[doc = crate::util::md_speclink!("_Toc3901037")]
    pub fn parse(input: &mut &Bytes) -> MResult<Self> {
        let level = parse_u8(input)?;

        ProtocolVersion::try_from(level).map_err(|_| MqttCodecError::UnsupportedProtocolVersion(level))
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        buffer.write_byte((*self).into())
    }

    /// Whether packets of this version carry properties and reason codes
    #[inline]
    pub fn is_v5(self) -> bool {
        self == ProtocolVersion::V5
    }
}

impl core::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolVersion::V3_1_1 => f.write_str("3.1.1"),
            ProtocolVersion::V5 => f.write_str("5.0"),
        }
    }
}
