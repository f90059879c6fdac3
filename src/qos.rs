//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use crate::error::MqttCodecError;
use crate::MResult;

#[derive(num_enum::TryFromPrimitive, num_enum::IntoPrimitive)]
#[repr(u8)]
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum QualityOfService {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QualityOfService {
    /// Interpret two bits taken from a flags field, rejecting the reserved value 3
    pub(crate) fn from_bits(bits: u8, field: &'static str) -> MResult<Self> {
        QualityOfService::try_from(bits).map_err(|_| MqttCodecError::MalformedPacket(field))
    }
}

#[cfg(test)]
mod tests {
    use super::QualityOfService;
    use crate::error::MqttCodecError;

    #[test]
    fn check_qos_bits() {
        assert_eq!(
            QualityOfService::from_bits(2, "qos").unwrap(),
            QualityOfService::ExactlyOnce
        );
        assert!(matches!(
            QualityOfService::from_bits(3, "qos"),
            Err(MqttCodecError::MalformedPacket("qos"))
        ));
        assert_eq!(u8::from(QualityOfService::AtLeastOnce), 1);
    }
}
