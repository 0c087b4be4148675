use log::*;
use paytm_tools::{GatewayStatus, PaytmApi, PaytmApiError, PaytmConfig};
use table_order_engine::{
    db_types::{Money, PaymentStatus, TransactionId, UserId},
    GatewayError,
    GatewayHandle,
    PaymentGateway,
};

/// Plugs the Paytm client into the checkout flow.
#[derive(Clone)]
pub struct PaytmGateway {
    api: PaytmApi,
}

impl PaytmGateway {
    pub fn new(config: PaytmConfig) -> Result<Self, PaytmApiError> {
        let api = PaytmApi::new(config)?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &PaytmApi {
        &self.api
    }
}

impl PaymentGateway for PaytmGateway {
    fn merchant_id(&self) -> &str {
        self.api.merchant_id()
    }

    async fn open_transaction(
        &self,
        user: &UserId,
        transaction_id: &TransactionId,
        amount: Money,
    ) -> Result<GatewayHandle, GatewayError> {
        let txn = self
            .api
            .initiate_transaction(user.as_str(), transaction_id.as_str(), amount)
            .await
            .map_err(gateway_error)?;
        trace!("💳️ Paytm issued a token for {transaction_id}");
        Ok(GatewayHandle { token: txn.txn_token, callback_url: txn.callback_url })
    }

    async fn query_status(&self, transaction_id: &TransactionId) -> Result<PaymentStatus, GatewayError> {
        let status = self.api.transaction_status(transaction_id.as_str()).await.map_err(gateway_error)?;
        Ok(payment_status(status))
    }
}

fn payment_status(status: GatewayStatus) -> PaymentStatus {
    match status {
        GatewayStatus::Successful => PaymentStatus::Successful,
        GatewayStatus::Pending => PaymentStatus::Pending,
        GatewayStatus::Failed => PaymentStatus::Failed,
    }
}

fn gateway_error(e: PaytmApiError) -> GatewayError {
    match e {
        PaytmApiError::Initialization(_) | PaytmApiError::RestRequestError(_) => GatewayError::Unreachable(e.to_string()),
        PaytmApiError::QueryError { status, .. } if status >= 500 => GatewayError::Unreachable(e.to_string()),
        PaytmApiError::QueryError { .. } | PaytmApiError::Rejected { .. } => GatewayError::Rejected(e.to_string()),
        PaytmApiError::RestResponseError(_) | PaytmApiError::JsonError(_) => GatewayError::InvalidResponse(e.to_string()),
    }
}
