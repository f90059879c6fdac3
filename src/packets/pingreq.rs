//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::level::ProtocolVersion;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[doc = crate::util::md_speclink!("_Toc3901195")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPingreq {
    pub version: ProtocolVersion,
}

impl MPingreq {
    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        if !input.is_empty() {
            return Err(MqttCodecError::MalformedPacket("a PINGREQ has no body"));
        }

        Ok(MPingreq { version })
    }

    pub fn write<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use super::MPingreq;
    use crate::error::MqttCodecError;
    use crate::level::ProtocolVersion;

    #[test]
    fn roundtrip_pingreq() {
        crate::test::make_roundtrip_test!(MPingreq {
            version: ProtocolVersion::V5
        });
    }

    #[test]
    fn check_pingreq_body() {
        assert!(matches!(
            MPingreq::parse(ProtocolVersion::V3_1_1, &mut Bytes::new(&[0x0u8])),
            Err(MqttCodecError::MalformedPacket(_))
        ));
    }
}
