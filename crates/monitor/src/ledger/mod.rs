use std::time::Duration;

use alertbot_domain::model::{BalanceEntry, DelegationRecord};
use alertbot_domain::services::telemetry::LEDGER_REQUESTS_TOTAL;
use async_trait::async_trait;
use metrics::counter;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

mod types;

pub use types::{
    BalancesResponse, Coin, Delegation, DelegationResponse, DelegationsResponse, StakeBalance,
    UnbondingDelegation, UnbondingEntry, UnbondingResponse,
};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{resource} request failed: {message}")]
    Transport {
        resource: &'static str,
        message: String,
    },
    #[error("{resource} request returned HTTP {status}")]
    Status { resource: &'static str, status: u16 },
    #[error("{resource} response did not match schema: {message}")]
    Decode {
        resource: &'static str,
        message: String,
    },
}

/// Read-only view of the ledger the monitor polls.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn fetch_account_balances(&self, address: &str) -> Result<Vec<BalanceEntry>, LedgerError>;
    /// Active delegations made by `address`.
    async fn fetch_self_delegation(&self, address: &str)
        -> Result<Vec<DelegationRecord>, LedgerError>;
    async fn fetch_unbonding_delegation(
        &self,
        address: &str,
    ) -> Result<Vec<DelegationRecord>, LedgerError>;
}

/// LCD (REST) client for a Cosmos SDK chain.
#[derive(Clone)]
pub struct LcdLedgerClient {
    http: reqwest::Client,
    base_url: String,
    staking_denom: String,
}

impl LcdLedgerClient {
    /// `staking_denom` labels stake amounts when the endpoint omits a denom.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        staking_denom: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            staking_denom: staking_denom.into(),
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        staking_denom: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(http, base_url, staking_denom))
    }

    async fn get_json<T>(&self, resource: &'static str, path: &str) -> Result<T, LedgerError>
    where
        T: DeserializeOwned,
    {
        let result = self.request(resource, path).await;
        match &result {
            Ok(_) => {
                counter!(LEDGER_REQUESTS_TOTAL, "resource" => resource, "result" => "ok")
                    .increment(1);
            }
            Err(err) => {
                counter!(LEDGER_REQUESTS_TOTAL, "resource" => resource, "result" => "error")
                    .increment(1);
                warn!(?err, resource, "ledger query failed");
            }
        }
        result
    }

    async fn request<T>(&self, resource: &'static str, path: &str) -> Result<T, LedgerError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| LedgerError::Transport {
                resource,
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| LedgerError::Transport {
                resource,
                message: err.to_string(),
            })?;
        serde_json::from_slice(&body).map_err(|err| LedgerError::Decode {
            resource,
            message: err.to_string(),
        })
    }

    fn stake_denom(&self, balance: Option<&StakeBalance>) -> String {
        balance
            .and_then(|b| b.denom.clone())
            .unwrap_or_else(|| self.staking_denom.clone())
    }
}

#[async_trait]
impl LedgerSource for LcdLedgerClient {
    async fn fetch_account_balances(&self, address: &str) -> Result<Vec<BalanceEntry>, LedgerError> {
        let path = format!("/cosmos/bank/v1beta1/balances/{address}");
        let response: BalancesResponse = self.get_json("balances", &path).await?;
        Ok(response
            .balances
            .into_iter()
            .map(|coin| BalanceEntry {
                denom: coin.denom,
                amount: coin.amount,
            })
            .collect())
    }

    async fn fetch_self_delegation(
        &self,
        address: &str,
    ) -> Result<Vec<DelegationRecord>, LedgerError> {
        let path = format!("/cosmos/staking/v1beta1/delegations/{address}");
        let response: DelegationsResponse = self.get_json("delegations", &path).await?;
        Ok(response
            .delegation_responses
            .into_iter()
            .map(|item| {
                let denom = self.stake_denom(Some(&item.balance));
                DelegationRecord::new(
                    item.delegation.validator_address,
                    item.balance.amount,
                    denom,
                )
            })
            .collect())
    }

    async fn fetch_unbonding_delegation(
        &self,
        address: &str,
    ) -> Result<Vec<DelegationRecord>, LedgerError> {
        let path = format!("/cosmos/staking/v1beta1/delegators/{address}/unbonding_delegations");
        let response: UnbondingResponse = self.get_json("unbonding_delegations", &path).await?;
        Ok(response
            .unbonding_responses
            .into_iter()
            .map(|item| {
                let denom = self.stake_denom(item.balance.as_ref());
                let raw_amount = unbonding_amount(&item);
                DelegationRecord::new(item.validator_address, raw_amount, denom)
            })
            .collect())
    }
}

/// A top-level balance wins; otherwise the entries' balances are summed.
fn unbonding_amount(item: &UnbondingDelegation) -> String {
    if let Some(balance) = &item.balance {
        return balance.amount.clone();
    }

    let mut total: u128 = 0;
    for entry in &item.entries {
        match entry.balance.parse::<u128>() {
            Ok(amount) => total = total.saturating_add(amount),
            Err(_) => warn!(
                balance = %entry.balance,
                validator = %item.validator_address,
                "unbonding entry balance is not an integer, counting it as zero"
            ),
        }
    }
    total.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACCOUNT: &str = "akash1account";

    fn client(server: &MockServer) -> LcdLedgerClient {
        LcdLedgerClient::new(reqwest::Client::new(), format!("{}/", server.uri()), "uakt")
    }

    async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn decodes_account_balances() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/cosmos/bank/v1beta1/balances/akash1account",
            ResponseTemplate::new(200).set_body_json(json!({
                "balances": [
                    {"denom": "ibc/170C", "amount": "12"},
                    {"denom": "uakt", "amount": "2000000"}
                ],
                "pagination": {"next_key": null, "total": "2"}
            })),
        )
        .await;

        let balances = client(&server)
            .fetch_account_balances(ACCOUNT)
            .await
            .expect("balances decode");
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[1].denom, "uakt");
        assert_eq!(balances[1].amount, "2000000");
    }

    #[tokio::test]
    async fn decodes_delegations() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/cosmos/staking/v1beta1/delegations/akash1account",
            ResponseTemplate::new(200).set_body_json(json!({
                "delegation_responses": [{
                    "delegation": {
                        "delegator_address": ACCOUNT,
                        "validator_address": "akashvaloper1val",
                        "shares": "5000000.000000000000000000"
                    },
                    "balance": {"denom": "uakt", "amount": "5000000"}
                }]
            })),
        )
        .await;

        let records = client(&server)
            .fetch_self_delegation(ACCOUNT)
            .await
            .expect("delegations decode");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].validator_address, "akashvaloper1val");
        assert_eq!(records[0].raw_amount, "5000000");
        assert_eq!(records[0].amount.value, dec!(5));
        assert_eq!(records[0].amount.denom, "uakt");
    }

    #[tokio::test]
    async fn sums_unbonding_entries() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/cosmos/staking/v1beta1/delegators/akash1account/unbonding_delegations",
            ResponseTemplate::new(200).set_body_json(json!({
                "unbonding_responses": [{
                    "delegator_address": ACCOUNT,
                    "validator_address": "akashvaloper1val",
                    "entries": [
                        {"creation_height": "10", "initial_balance": "1500000", "balance": "1500000"},
                        {"creation_height": "11", "initial_balance": "500000", "balance": "500000"}
                    ]
                }]
            })),
        )
        .await;

        let records = client(&server)
            .fetch_unbonding_delegation(ACCOUNT)
            .await
            .expect("unbonding decodes");
        assert_eq!(records[0].raw_amount, "2000000");
        assert_eq!(records[0].amount.value, dec!(2));
        assert_eq!(records[0].amount.denom, "uakt");
    }

    #[tokio::test]
    async fn top_level_unbonding_balance_is_honored() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/cosmos/staking/v1beta1/delegators/akash1account/unbonding_delegations",
            ResponseTemplate::new(200).set_body_json(json!({
                "unbonding_responses": [{
                    "validator_address": "akashvaloper1val",
                    "balance": {"amount": "750000"}
                }]
            })),
        )
        .await;

        let records = client(&server)
            .fetch_unbonding_delegation(ACCOUNT)
            .await
            .expect("unbonding decodes");
        assert_eq!(records[0].raw_amount, "750000");
    }

    #[tokio::test]
    async fn schema_mismatch_is_decode_error() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/cosmos/bank/v1beta1/balances/akash1account",
            ResponseTemplate::new(200).set_body_json(json!({"balance": []})),
        )
        .await;

        let err = client(&server)
            .fetch_account_balances(ACCOUNT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Decode {
                resource: "balances",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/cosmos/staking/v1beta1/delegations/akash1account",
            ResponseTemplate::new(503),
        )
        .await;

        let err = client(&server)
            .fetch_self_delegation(ACCOUNT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Status {
                resource: "delegations",
                status: 503
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let client = LcdLedgerClient::with_timeout(
            "http://127.0.0.1:9",
            "uakt",
            Duration::from_millis(500),
        )
        .expect("client builds");

        let err = client.fetch_account_balances(ACCOUNT).await.unwrap_err();
        assert!(matches!(err, LedgerError::Transport { .. }));
    }
}
