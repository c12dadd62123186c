//! Settlement DTOs

use serde::{Deserialize, Serialize};

use core_kernel::{GroupId, MemberId};
use domain_settlement::{CalculationResult, CalculatorConfig, Expense, SettlementReport};

#[derive(Debug, Serialize, Deserialize)]
pub struct BalancesRequest {
    #[serde(default, alias = "groupId")]
    pub group_id: Option<GroupId>,
    #[serde(alias = "viewerId")]
    pub viewer_id: MemberId,
    pub expenses: Vec<Expense>,
    /// Overrides the server's calculator settings for this request
    #[serde(default)]
    pub options: Option<CalculatorConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettlementRequest {
    #[serde(default, alias = "groupId")]
    pub group_id: Option<GroupId>,
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub options: Option<CalculatorConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalancesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub viewer_id: MemberId,
    #[serde(flatten)]
    pub result: CalculationResult,
}

#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(flatten)]
    pub report: SettlementReport,
}
