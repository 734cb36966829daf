use crate::config::{MAX_TWO_AUTH_APPROVERS, MAX_TWO_AUTH_RULES};
use crate::crypto::PublicKey;
use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use crate::time::TimestampMillis;
use crate::two_auth::{TwoAuthError, TwoAuthRule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-account two-authorization policy.
///
/// Registered once by the account owner. The rule list decides which
/// transfers need a second authorization and the approver set lists the keys
/// allowed to grant one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TwoAuthParameters {
    /// Owner of the guarded token account
    pub owner: PublicKey,

    /// The guarded token account
    pub token_account: PublicKey,

    /// Policy rules, combined conjunctively
    pub rules: Vec<TwoAuthRule>,

    /// Keys allowed to authorize transfers
    pub approvers: Vec<PublicKey>,

    /// Registration timestamp
    pub created_at: TimestampMillis,
}

impl TwoAuthParameters {
    pub fn new(
        owner: PublicKey,
        token_account: PublicKey,
        rules: Vec<TwoAuthRule>,
        approvers: Vec<PublicKey>,
        created_at: TimestampMillis,
    ) -> Self {
        Self {
            owner,
            token_account,
            rules,
            approvers,
            created_at,
        }
    }

    /// Validate the configuration against protocol bounds
    pub fn validate(&self) -> Result<(), TwoAuthError> {
        if self.approvers.is_empty() {
            return Err(TwoAuthError::EmptyApprovers);
        }

        if self.rules.len() > MAX_TWO_AUTH_RULES {
            return Err(TwoAuthError::TooManyRules {
                count: self.rules.len(),
                max: MAX_TWO_AUTH_RULES,
            });
        }

        if self.approvers.len() > MAX_TWO_AUTH_APPROVERS {
            return Err(TwoAuthError::TooManyApprovers {
                count: self.approvers.len(),
                max: MAX_TWO_AUTH_APPROVERS,
            });
        }

        let mut seen: HashSet<&PublicKey> = HashSet::new();
        for approver in &self.approvers {
            if !seen.insert(approver) {
                return Err(TwoAuthError::DuplicateApprover(*approver));
            }
        }

        Ok(())
    }

    /// Whether a transfer of `amount` needs a second authorization.
    ///
    /// Conjunctive combination: all rules must ask for one. An empty rule
    /// list therefore always requires authorization.
    pub fn requires_approval(&self, amount: u64) -> bool {
        self.rules.iter().all(|rule| rule.requires_approval(amount))
    }

    /// Whether `key` belongs to the approver set
    pub fn is_approver(&self, key: &PublicKey) -> bool {
        self.approvers.iter().any(|approver| approver == key)
    }
}

impl Serializer for TwoAuthParameters {
    fn write(&self, writer: &mut Writer) {
        self.owner.write(writer);
        self.token_account.write(writer);
        writer.write_u8(self.rules.len() as u8);
        for rule in &self.rules {
            rule.write(writer);
        }
        writer.write_u8(self.approvers.len() as u8);
        for approver in &self.approvers {
            approver.write(writer);
        }
        writer.write_u64(&self.created_at);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let owner = PublicKey::read(reader)?;
        let token_account = PublicKey::read(reader)?;

        let rule_count = reader.read_u8()? as usize;
        if rule_count > MAX_TWO_AUTH_RULES {
            return Err(ReaderError::InvalidSize);
        }
        let mut rules = Vec::with_capacity(rule_count);
        for _ in 0..rule_count {
            rules.push(TwoAuthRule::read(reader)?);
        }

        let approver_count = reader.read_u8()? as usize;
        if approver_count > MAX_TWO_AUTH_APPROVERS {
            return Err(ReaderError::InvalidSize);
        }
        let mut approvers = Vec::with_capacity(approver_count);
        for _ in 0..approver_count {
            approvers.push(PublicKey::read(reader)?);
        }

        let created_at = reader.read_u64()?;

        Ok(Self {
            owner,
            token_account,
            rules,
            approvers,
            created_at,
        })
    }

    fn size(&self) -> usize {
        32 + 32
            + 1
            + self.rules.iter().map(Serializer::size).sum::<usize>()
            + 1
            + self.approvers.len() * 32
            + 8
    }
}
