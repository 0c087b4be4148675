use serde::{Deserialize, Serialize};
use tos_common::{helpers::calculate_hmac, Money, DEFAULT_CURRENCY_CODE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnAmount {
    /// Major units with exactly two decimals, e.g. `"354.00"`.
    pub value: String,
    pub currency: String,
}

impl From<Money> for TxnAmount {
    fn from(amount: Money) -> Self {
        Self { value: amount.to_string(), currency: DEFAULT_CURRENCY_CODE.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub cust_id: String,
}

/// The body of an `initiateTransaction` call. Paytm's `orderId` is our transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateTransactionBody {
    pub request_type: String,
    pub mid: String,
    pub website_name: String,
    pub order_id: String,
    pub txn_amount: TxnAmount,
    pub user_info: UserInfo,
    pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQueryBody {
    pub mid: String,
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHead {
    pub signature: String,
}

/// A request body together with its HMAC-SHA256 signature under the merchant key.
#[derive(Debug, Clone, Serialize)]
pub struct SignedRequest<B: Serialize> {
    pub body: B,
    pub head: RequestHead,
}

impl<B: Serialize> SignedRequest<B> {
    pub fn new(body: B, merchant_key: &str) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(&body)?;
        let signature = calculate_hmac(merchant_key, &json);
        Ok(Self { body, head: RequestHead { signature } })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInfo {
    pub result_status: String,
    pub result_code: String,
    #[serde(default)]
    pub result_msg: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GatewayResponse<B> {
    pub body: B,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InitiateTransactionResponse {
    pub result_info: ResultInfo,
    pub txn_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusQueryResponse {
    pub result_info: ResultInfo,
}

/// What the diner's client needs to launch the Paytm payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatedTransaction {
    pub txn_token: String,
    pub callback_url: String,
}

/// Paytm's view of a transaction, reduced to what matters for settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Successful,
    Pending,
    Failed,
}

impl GatewayStatus {
    /// Maps a status query result code. `501` is formally a failure, but the staging gateway returns it for payments
    /// that the app shows as successful.
    pub fn from_result_code(code: &str) -> Self {
        match code {
            "01" | "501" => Self::Successful,
            "400" | "402" => Self::Pending,
            _ => Self::Failed,
        }
    }
}
