//! A small client for the two Paytm calls that table ordering needs: initiating a transaction and asking for its
//! status. It knows nothing about orders or the engine.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::PaytmApi;
pub use config::PaytmConfig;
pub use data_objects::{
    GatewayStatus,
    InitiateTransactionBody,
    InitiatedTransaction,
    RequestHead,
    ResultInfo,
    SignedRequest,
    StatusQueryBody,
    TxnAmount,
    UserInfo,
};
pub use error::PaytmApiError;
