//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::time::Duration;

use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::level::ProtocolVersion;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// The final packet of a connection
///
/// In MQTT 3.1.1 it has no body and may only be sent by clients. MQTT 5.0 adds a reason code
/// and properties, both of which can be left out when the disconnection is normal.
#[doc = crate::util::md_speclink!("_Toc3901205")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MDisconnect {
    pub version: ProtocolVersion,
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl MDisconnect {
    pub fn new(version: ProtocolVersion) -> Self {
        MDisconnect {
            version,
            reason_code: ReasonCode::NORMAL_DISCONNECTION,
            properties: Properties::new(),
        }
    }

    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        let mut packet = Self::new(version);

        if input.is_empty() {
            return Ok(packet);
        }

        if version == ProtocolVersion::V3_1_1 {
            return Err(MqttCodecError::MalformedPacket(
                "a DISCONNECT has no body in MQTT 3.1.1",
            ));
        }

        packet.reason_code = ReasonCode::parse(input, PacketKind::Disconnect, version)?;

        if !input.is_empty() {
            packet.properties = Properties::parse(input, PacketKind::Disconnect)?;
        }

        Ok(packet)
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        let is_normal =
            self.reason_code == ReasonCode::NORMAL_DISCONNECTION && self.properties.is_empty();

        match self.version {
            ProtocolVersion::V3_1_1 if is_normal => Ok(()),
            ProtocolVersion::V3_1_1 => Err(MqttCodecError::MalformedPacket(
                "a DISCONNECT has no body in MQTT 3.1.1",
            )
            .into()),
            ProtocolVersion::V5 if is_normal => Ok(()),
            ProtocolVersion::V5 => {
                self.reason_code
                    .write(buffer, PacketKind::Disconnect, self.version)?;

                if self.properties.is_empty() {
                    return Ok(());
                }

                self.properties.write(buffer, PacketKind::Disconnect)
            }
        }
    }

    /// The session expiry the client asks for on disconnect, overriding the one from CONNECT
    pub fn session_expiry_interval(&self) -> Option<Duration> {
        self.properties
            .session_expiry_interval()
            .map(|secs| Duration::from_secs(u64::from(secs)))
    }
}
