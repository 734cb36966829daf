use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use serde::{Deserialize, Serialize};

/// A single transfer policy rule.
///
/// Rules are combined conjunctively: a transfer needs a second authorization
/// only when every configured rule asks for one. An empty rule list is the
/// strictest policy and requires authorization for every transfer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum TwoAuthRule {
    /// Every transfer requires a second authorization
    Always,
    /// No transfer requires a second authorization
    Never,
    /// Transfers at or above `max` require a second authorization
    OnMax { max: u64 },
}

impl TwoAuthRule {
    /// Whether this rule asks for a second authorization on `amount`
    pub fn requires_approval(&self, amount: u64) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::OnMax { max } => amount >= *max,
        }
    }
}

impl Serializer for TwoAuthRule {
    fn write(&self, writer: &mut Writer) {
        match self {
            Self::Always => writer.write_u8(0),
            Self::Never => writer.write_u8(1),
            Self::OnMax { max } => {
                writer.write_u8(2);
                writer.write_u64(max);
            }
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(match reader.read_u8()? {
            0 => Self::Always,
            1 => Self::Never,
            2 => Self::OnMax {
                max: reader.read_u64()?,
            },
            _ => return Err(ReaderError::InvalidValue),
        })
    }

    fn size(&self) -> usize {
        match self {
            Self::Always | Self::Never => 1,
            Self::OnMax { .. } => 1 + 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_and_never() {
        assert!(TwoAuthRule::Always.requires_approval(0));
        assert!(TwoAuthRule::Always.requires_approval(u64::MAX));
        assert!(!TwoAuthRule::Never.requires_approval(0));
        assert!(!TwoAuthRule::Never.requires_approval(u64::MAX));
    }

    #[test]
    fn test_on_max_boundary() {
        let rule = TwoAuthRule::OnMax { max: 100 };
        assert!(!rule.requires_approval(99));
        // Threshold amount itself requires authorization
        assert!(rule.requires_approval(100));
        assert!(rule.requires_approval(101));
    }

    #[test]
    fn test_serializer_roundtrip() {
        for rule in [
            TwoAuthRule::Always,
            TwoAuthRule::Never,
            TwoAuthRule::OnMax { max: 5_000 },
        ] {
            let bytes = rule.to_bytes();
            assert_eq!(bytes.len(), rule.size());
            let decoded = TwoAuthRule::from_bytes(&bytes).unwrap();
            assert_eq!(decoded, rule);
        }
    }

    #[test]
    fn test_unknown_discriminant_rejected() {
        assert!(matches!(
            TwoAuthRule::from_bytes(&[9]),
            Err(ReaderError::InvalidValue)
        ));
    }

    #[test]
    fn test_json_tagged_representation() {
        let json = serde_json::to_string(&TwoAuthRule::OnMax { max: 250 }).unwrap();
        assert_eq!(json, r#"{"type":"onMax","max":250}"#);
        let decoded: TwoAuthRule = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, TwoAuthRule::OnMax { max: 250 });
    }
}
