use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use tos_common::Money;

use crate::{
    config::PaytmConfig,
    data_objects::{
        GatewayResponse,
        GatewayStatus,
        InitiateTransactionBody,
        InitiateTransactionResponse,
        InitiatedTransaction,
        SignedRequest,
        StatusQueryBody,
        StatusQueryResponse,
        UserInfo,
    },
    PaytmApiError,
};

#[derive(Clone)]
pub struct PaytmApi {
    config: PaytmConfig,
    client: Arc<Client>,
}

impl PaytmApi {
    pub fn new(config: PaytmConfig) -> Result<Self, PaytmApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaytmApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PaytmConfig {
        &self.config
    }

    pub fn merchant_id(&self) -> &str {
        self.config.merchant_id.as_str()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// The page the gateway returns the diner to once payment for `txn_id` is done.
    pub fn callback_url_for(&self, txn_id: &str) -> String {
        format!("{}?ORDER_ID={txn_id}", self.config.callback_url)
    }

    /// Signs `body` and POSTs it to `path`, returning the `body` of the gateway's response.
    pub async fn signed_post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        body: B,
    ) -> Result<T, PaytmApiError> {
        let request = SignedRequest::new(body, self.config.merchant_key.reveal())
            .map_err(|e| PaytmApiError::JsonError(e.to_string()))?;
        let url = self.url(path);
        trace!("Sending signed request: {url}");
        let mut req = self.client.post(url);
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.json(&request).send().await.map_err(|e| PaytmApiError::RestRequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("Request successful. {}", response.status());
            let result = response
                .json::<GatewayResponse<T>>()
                .await
                .map_err(|e| PaytmApiError::JsonError(e.to_string()))?;
            Ok(result.body)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PaytmApiError::RestResponseError(e.to_string()))?;
            Err(PaytmApiError::QueryError { status, message })
        }
    }

    /// Opens a Paytm transaction for `amount`. Paytm calls our transaction id its `orderId`.
    pub async fn initiate_transaction(
        &self,
        cust_id: &str,
        txn_id: &str,
        amount: Money,
    ) -> Result<InitiatedTransaction, PaytmApiError> {
        let callback_url = self.callback_url_for(txn_id);
        let body = InitiateTransactionBody {
            request_type: "Payment".to_string(),
            mid: self.config.merchant_id.clone(),
            website_name: self.config.website.clone(),
            order_id: txn_id.to_string(),
            txn_amount: amount.into(),
            user_info: UserInfo { cust_id: cust_id.to_string() },
            callback_url: callback_url.clone(),
        };
        debug!("Initiating Paytm transaction {txn_id} for {amount}");
        let params = [("mid", self.config.merchant_id.as_str()), ("orderId", txn_id)];
        let response: InitiateTransactionResponse =
            self.signed_post("/theia/api/v1/initiateTransaction", &params, body).await?;
        let info = response.result_info;
        match response.txn_token {
            Some(txn_token) if info.result_status == "S" => {
                info!("Paytm transaction {txn_id} initiated");
                Ok(InitiatedTransaction { txn_token, callback_url })
            },
            _ => {
                warn!("Paytm refused to initiate {txn_id}. [{}] {}", info.result_code, info.result_msg);
                Err(PaytmApiError::Rejected { code: info.result_code, message: info.result_msg })
            },
        }
    }

    pub async fn transaction_status(&self, txn_id: &str) -> Result<GatewayStatus, PaytmApiError> {
        let body = StatusQueryBody { mid: self.config.merchant_id.clone(), order_id: txn_id.to_string() };
        let response: StatusQueryResponse = self.signed_post("/v3/order/status", &[], body).await?;
        let info = response.result_info;
        let status = GatewayStatus::from_result_code(&info.result_code);
        debug!("Paytm status for {txn_id}: [{}] {} => {status:?}", info.result_code, info.result_status);
        Ok(status)
    }
}
