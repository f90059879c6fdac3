//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::integers::parse_u8;
use crate::integers::write_u8;
use crate::level::ProtocolVersion;
use crate::packets::parse_properties;
use crate::packets::write_properties;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

const SESSION_PRESENT_FLAG: u8 = 0b0000_0001;

#[doc = crate::util::md_speclink!("_Toc3901074")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MConnack {
    pub version: ProtocolVersion,
    pub session_present: bool,
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl MConnack {
    pub fn new(version: ProtocolVersion, reason_code: ReasonCode) -> Self {
        MConnack {
            version,
            session_present: false,
            reason_code,
            properties: Properties::new(),
        }
    }

    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        let acknowledge_flags = parse_u8(input)?;
        if acknowledge_flags & !SESSION_PRESENT_FLAG != 0 {
            return Err(MqttCodecError::MalformedPacket(
                "only the session present bit may be set in the acknowledge flags",
            ));
        }
        let session_present = acknowledge_flags & SESSION_PRESENT_FLAG != 0;

        let reason_code = ReasonCode::parse(input, PacketKind::ConnAck, version)?;
        Self::check_session_present(session_present, reason_code)?;

        let properties = parse_properties(version, input, PacketKind::ConnAck)?;

        Ok(MConnack {
            version,
            session_present,
            reason_code,
            properties,
        })
    }

    fn check_session_present(session_present: bool, reason_code: ReasonCode) -> MResult<()> {
        if session_present && reason_code != ReasonCode::SUCCESS {
            return Err(MqttCodecError::MalformedPacket(
                "a refused connection cannot have a session present",
            ));
        }

        Ok(())
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        Self::check_session_present(self.session_present, self.reason_code)?;

        write_u8(buffer, u8::from(self.session_present))?;
        self.reason_code
            .write(buffer, PacketKind::ConnAck, self.version)?;
        write_properties(self.version, &self.properties, buffer, PacketKind::ConnAck)
    }
}

#[cfg(test)]
mod tests {
    use winnow::Bytes;

    use super::MConnack;
    use crate::error::MqttCodecError;
    use crate::level::ProtocolVersion;
    use crate::properties::Properties;
    use crate::properties::PropertyId;
    use crate::properties::PropertyValue;
    use crate::reason_code::ReasonCode;

    #[test]
    fn roundtrip_v3_connack() {
        crate::test::make_roundtrip_test!(MConnack {
            version: ProtocolVersion::V3_1_1,
            session_present: false,
            reason_code: ReasonCode::NOT_AUTHORIZED_V3,
            properties: Properties::new(),
        });
    }

    #[test]
    fn roundtrip_v5_connack() {
        crate::test::make_roundtrip_test!(MConnack {
            version: ProtocolVersion::V5,
            session_present: true,
            reason_code: ReasonCode::SUCCESS,
            properties: Properties::new()
                .with(
                    PropertyId::AssignedClientIdentifier,
                    PropertyValue::Str(String::from("auto-1234"))
                )
                .unwrap()
                .with(PropertyId::ServerKeepAlive, PropertyValue::Short(30))
                .unwrap()
                .with(PropertyId::MaximumQoS, PropertyValue::Byte(1))
                .unwrap(),
        });
    }

    #[test]
    fn check_acknowledge_flags() {
        assert!(matches!(
            MConnack::parse(ProtocolVersion::V3_1_1, &mut Bytes::new(&[0x02u8, 0x00])),
            Err(MqttCodecError::MalformedPacket(_))
        ));
        assert!(matches!(
            MConnack::parse(ProtocolVersion::V3_1_1, &mut Bytes::new(&[0x01u8, 0x05])),
            Err(MqttCodecError::MalformedPacket(_))
        ));
    }

    #[test]
    fn check_reason_codes_per_version() {
        assert!(matches!(
            MConnack::parse(ProtocolVersion::V3_1_1, &mut Bytes::new(&[0x00u8, 0x87])),
            Err(MqttCodecError::InvalidReasonCode { code: 0x87, .. })
        ));
        assert!(matches!(
            MConnack::parse(ProtocolVersion::V5, &mut Bytes::new(&[0x00u8, 0x05, 0x00])),
            Err(MqttCodecError::InvalidReasonCode { code: 0x05, .. })
        ));

        let connack =
            MConnack::parse(ProtocolVersion::V5, &mut Bytes::new(&[0x00u8, 0x87, 0x00])).unwrap();
        assert_eq!(connack, MConnack::new(ProtocolVersion::V5, ReasonCode::NOT_AUTHORIZED));
    }
}
