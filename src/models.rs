//! Data models shared across the pipeline stages

use serde::Deserialize;
use serde::Serialize;

/// Sentinel wallet address recorded for users with no verified address
pub const NO_VERIFIED_ADDRESS: &str = "NO_VERIFIED_ADDRESS";

/// Addresses a user has cryptographically associated with their account,
/// grouped by verification type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifiedAddresses {
    #[serde(default)]
    pub eth_addresses: Vec<String>,
    #[serde(default)]
    pub sol_addresses: Vec<String>,
}

/// Author of a cast as returned by the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastAuthor {
    pub fid: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub pfp_url: Option<String>,
    #[serde(default)]
    pub verified_addresses: VerifiedAddresses,
}

/// One raw result from the cast search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cast {
    #[serde(default)]
    pub author: Option<CastAuthor>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub hash: Option<String>,
}

/// One record per unique author, snapshotted from the first cast seen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalUser {
    pub fid: u64,
    pub username: String,
    pub display_name: String,
    pub verified_addresses: VerifiedAddresses,
    pub follower_count: u64,
    pub profile_image: String,
}

impl CanonicalUser {
    /// Snapshot a user from a cast author. Returns `None` when the author
    /// has no username.
    #[must_use]
    pub fn from_author(author: &CastAuthor) -> Option<Self> {
        let username = author.username.clone()?;
        Some(Self {
            fid: author.fid,
            display_name: author
                .display_name
                .clone()
                .unwrap_or_else(|| username.clone()),
            username,
            verified_addresses: author.verified_addresses.clone(),
            follower_count: author.follower_count,
            profile_image: author.pfp_url.clone().unwrap_or_default(),
        })
    }
}

/// Why a user landed on the eligibility list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityReason {
    /// No verified address on the relevant chain
    #[serde(rename = "NO_ADDRESS")]
    NoAddress,
    /// Verified addresses exist but none holds the token
    #[serde(rename = "NO_TOKEN")]
    NoToken,
}

impl EligibilityReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAddress => "NO_ADDRESS",
            Self::NoToken => "NO_TOKEN",
        }
    }
}

/// A user eligible for the airdrop (does not hold the token)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityRecord {
    pub user: CanonicalUser,
    /// A real checked address, or [`NO_VERIFIED_ADDRESS`]
    pub wallet_address: String,
    pub reason: EligibilityReason,
}
