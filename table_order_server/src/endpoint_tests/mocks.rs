use chrono::{DateTime, Utc};
use mockall::mock;
use table_order_engine::{
    db_types::{
        CartLine,
        MenuItem,
        MenuItemId,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        PaymentStatus,
        Restaurant,
        RestaurantId,
        Table,
        TableId,
        Transaction,
        TransactionId,
        UserId,
    },
    traits::{CatalogManagement, CheckoutManagement, GatewayHandle, OrderFlowError, OrderManagement, StatusUpdate},
};

mock! {
    pub Backend {}
    impl CatalogManagement for Backend {
        async fn fetch_restaurant(&self, id: &RestaurantId) -> Result<Option<Restaurant>, OrderFlowError>;
        async fn fetch_table(&self, id: &TableId) -> Result<Option<Table>, OrderFlowError>;
        async fn fetch_menu_items(&self, ids: &[MenuItemId]) -> Result<Vec<MenuItem>, OrderFlowError>;
        async fn fetch_menu(&self, restaurant_id: &RestaurantId) -> Result<Vec<MenuItem>, OrderFlowError>;
    }
    impl OrderManagement for Backend {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;
        async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderFlowError>;
        async fn merge_items(&self, order_id: &OrderId, requester: &UserId, lines: &[CartLine]) -> Result<Order, OrderFlowError>;
    }
    impl CheckoutManagement for Backend {
        async fn fetch_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, OrderFlowError>;
        async fn fetch_transactions_for_order(&self, order_id: &OrderId) -> Result<Vec<Transaction>, OrderFlowError>;
        async fn begin_checkout(&self, order_id: &OrderId, requester: &UserId, transaction_id: &TransactionId) -> Result<(Order, Transaction), OrderFlowError>;
        async fn attach_gateway_handle(&self, transaction_id: &TransactionId, handle: &GatewayHandle) -> Result<Transaction, OrderFlowError>;
        async fn abandon_checkout(&self, transaction_id: &TransactionId) -> Result<(), OrderFlowError>;
        async fn update_payment_status(&self, transaction_id: &TransactionId, status: PaymentStatus) -> Result<StatusUpdate, OrderFlowError>;
        async fn fetch_unsettled_transactions(&self, older_than: DateTime<Utc>) -> Result<Vec<Transaction>, OrderFlowError>;
    }
}
