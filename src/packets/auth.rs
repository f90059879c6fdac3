//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::fixed_header::PacketKind;
use crate::level::ProtocolVersion;
use crate::properties::Properties;
use crate::reason_code::ReasonCode;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

/// Extended authentication exchange, only part of MQTT 5.0
#[doc = crate::util::md_speclink!("_Toc3901217")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MAuth {
    pub version: ProtocolVersion,
    pub reason_code: ReasonCode,
    pub properties: Properties,
}

impl MAuth {
    pub fn new(reason_code: ReasonCode) -> Self {
        MAuth {
            version: ProtocolVersion::V5,
            reason_code,
            properties: Properties::new(),
        }
    }

    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        Self::check_version(version)?;

        let mut packet = Self::new(ReasonCode::SUCCESS);

        if input.is_empty() {
            return Ok(packet);
        }

        packet.reason_code = ReasonCode::parse(input, PacketKind::Auth, version)?;

        if !input.is_empty() {
            packet.properties = Properties::parse(input, PacketKind::Auth)?;
        }

        Ok(packet)
    }

    fn check_version(version: ProtocolVersion) -> MResult<()> {
        if !version.is_v5() {
            return Err(MqttCodecError::MalformedPacket(
                "AUTH packets only exist in MQTT 5.0",
            ));
        }

        Ok(())
    }

    pub fn write<W: WriteMqttPacket>(&self, buffer: &mut W) -> WResult<W> {
        Self::check_version(self.version)?;

        if self.reason_code == ReasonCode::SUCCESS && self.properties.is_empty() {
            return Ok(());
        }

        self.reason_code
            .write(buffer, PacketKind::Auth, self.version)?;

        if self.properties.is_empty() {
            return Ok(());
        }

        self.properties.write(buffer, PacketKind::Auth)
    }

    pub fn authentication_method(&self) -> Option<&str> {
        self.properties.authentication_method()
    }
}
