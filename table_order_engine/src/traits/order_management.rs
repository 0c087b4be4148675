use crate::{
    db_types::{CartLine, NewOrder, Order, OrderId, OrderItem, UserId},
    traits::OrderFlowError,
};

#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a brand-new order with status `NotPaid` and zero totals.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderFlowError>;

    /// Adds the cart lines to the order in one atomic store transaction.
    ///
    /// The caller has already validated the shape of `lines` (non-empty, quantities in range, distinct ids).
    /// Implementations must, in this order:
    /// * fail with `OrderNotFound` if the order does not exist, or `Unauthorized` if `requester` does not own it,
    /// * fail with `InvalidArgument` if any item is missing, retired, or not on the order's restaurant menu,
    /// * fail with `AlreadyPaid` if the order is `Successful`, or `OrderFrozen` if checkout has started,
    /// * upsert each line (adding quantity and price to an existing row) and add the sum of the line totals to the
    ///   order subtotal.
    ///
    /// Concurrent merges on the same order must serialise so that no increment is lost.
    /// Returns the updated order.
    async fn merge_items(
        &self,
        order_id: &OrderId,
        requester: &UserId,
        lines: &[CartLine],
    ) -> Result<Order, OrderFlowError>;
}
