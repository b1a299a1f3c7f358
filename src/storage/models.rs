use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Click lifecycle: pending until a verified webhook converts it.
/// The transition is one-way; a converted click never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickStatus {
    Pending,
    Converted,
}

impl ClickStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Converted => "converted",
        }
    }
}

impl std::str::FromStr for ClickStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "converted" => Ok(Self::Converted),
            _ => Err(format!("Unknown click status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Pending,
    Reversed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Pending => "pending",
            Self::Reversed => "reversed",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "pending" => Ok(Self::Pending),
            "reversed" => Ok(Self::Reversed),
            _ => Err(format!("Unknown transaction status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Legal lifecycle moves, driven by an owner-role actor:
    /// pending -> approved | rejected, approved -> completed.
    pub fn can_transition_to(&self, next: WithdrawalStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Completed)
        )
    }

    /// Statuses that reserve funds against the user's balance. Rejected
    /// withdrawals release their reservation.
    pub fn reserves_balance(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl std::str::FromStr for WithdrawalStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown withdrawal status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Click {
    pub id: String,
    pub product_id: String,
    pub platform: String,
    pub user_id: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub status: ClickStatus,
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub converted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub id: String,
    pub product_id: String,
    pub platform: String,
    pub user_id: Option<String>,
    pub click_id: Option<String>,
    pub destination_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: Option<String>,
    pub platform: String,
    pub product_id: Option<String>,
    pub amount: Decimal,
    pub order_id: String,
    pub click_id: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub method: String,
    pub details: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_transitions() {
        use WithdrawalStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Completed));

        assert!(!Completed.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn rejected_releases_reservation() {
        assert!(WithdrawalStatus::Pending.reserves_balance());
        assert!(WithdrawalStatus::Approved.reserves_balance());
        assert!(WithdrawalStatus::Completed.reserves_balance());
        assert!(!WithdrawalStatus::Rejected.reserves_balance());
    }

    #[test]
    fn status_round_trips() {
        for s in ["pending", "converted"] {
            let parsed: ClickStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        for s in ["pending", "approved", "completed", "rejected"] {
            let parsed: WithdrawalStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }
}
