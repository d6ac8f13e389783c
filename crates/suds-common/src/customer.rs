use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty_tier: Option<LoyaltyTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    /// Tier earned by a points balance.
    pub fn for_points(points: u32) -> Self {
        match points {
            p if p >= 1000 => Self::Platinum,
            p if p >= 500 => Self::Gold,
            p if p >= 200 => Self::Silver,
            _ => Self::Bronze,
        }
    }

    /// Points at which this tier starts.
    pub fn threshold(&self) -> u32 {
        match self {
            Self::Bronze => 0,
            Self::Silver => 200,
            Self::Gold => 500,
            Self::Platinum => 1000,
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }
}

impl std::fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoyaltyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(format!("Invalid loyalty tier: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardKind {
    Discount,
    FreeService,
    Gift,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub points_cost: u32,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    #[serde(default)]
    pub expiry_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemedReward {
    pub id: String,
    pub reward_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub points_cost: u32,
}

/// Loyalty balance of one customer, as returned by `GET /api/loyalty/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyAccount {
    #[serde(default)]
    pub id: String,
    pub customer_id: String,
    pub points: u32,
    #[serde(default)]
    pub lifetime_points: u32,
    pub tier: LoyaltyTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub redeemed_rewards: Vec<RedeemedReward>,
}

impl LoyaltyAccount {
    pub fn can_redeem(&self, reward: &Reward) -> bool {
        self.points >= reward.points_cost
    }

    /// Points still needed to reach the next tier, `None` at the top tier.
    pub fn points_to_next_tier(&self) -> Option<u32> {
        let current = LoyaltyTier::for_points(self.points);
        current
            .next()
            .map(|next| next.threshold().saturating_sub(self.points))
    }
}
