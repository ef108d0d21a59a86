//! Response schemas of the LCD endpoints the monitor reads. Required fields
//! are strict; anything the monitor does not use (pagination, heights) is
//! ignored.

use serde::Deserialize;

/// `GET /cosmos/bank/v1beta1/balances/{address}`
#[derive(Debug, Clone, Deserialize)]
pub struct BalancesResponse {
    pub balances: Vec<Coin>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

/// `GET /cosmos/staking/v1beta1/delegations/{address}`
#[derive(Debug, Clone, Deserialize)]
pub struct DelegationsResponse {
    pub delegation_responses: Vec<DelegationResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DelegationResponse {
    pub delegation: Delegation,
    pub balance: StakeBalance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Delegation {
    pub validator_address: String,
}

/// Staking balances always carry an amount; the denom is optional because
/// some LCD versions omit it.
#[derive(Debug, Clone, Deserialize)]
pub struct StakeBalance {
    #[serde(default)]
    pub denom: Option<String>,
    pub amount: String,
}

/// `GET /cosmos/staking/v1beta1/delegators/{address}/unbonding_delegations`
#[derive(Debug, Clone, Deserialize)]
pub struct UnbondingResponse {
    pub unbonding_responses: Vec<UnbondingDelegation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnbondingDelegation {
    pub validator_address: String,
    #[serde(default)]
    pub balance: Option<StakeBalance>,
    #[serde(default)]
    pub entries: Vec<UnbondingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnbondingEntry {
    pub balance: String,
}
