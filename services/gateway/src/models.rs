use auction_engine::EngineSnapshot;
use serde::{Deserialize, Serialize};
use types::auction::AuctionRecord;
use types::bid::Bid;
use types::ids::UserId;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionRequest {
    pub name: String,
    pub gift_name: String,
    pub plan: Vec<PlanEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub count_of_gifts: u32,
    /// Round duration in seconds.
    pub time: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRequest {
    pub user_id: UserId,
    pub amount: u64,
}

/// Success body of bid submission; rejections are rendered by
/// [`crate::error::AppError`] with `ok: false` and the error kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAccepted {
    pub ok: bool,
    pub new_bid: Bid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionView {
    #[serde(flatten)]
    pub record: AuctionRecord,
    /// Live engine state; absent when the auction is not registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<EngineSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub amount: u64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUsersRequest {
    pub users: Vec<NewUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub balance: u64,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUsersResponse {
    pub created: usize,
    pub ids: Vec<UserId>,
}
