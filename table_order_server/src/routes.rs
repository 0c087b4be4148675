//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the store or the payment gateway, so they
//! are all async and never block.
//!
//! Diner routes take a [`JwtClaims`] argument, which authenticates the request. The gateway callback is authenticated
//! by the HMAC middleware instead, so it carries no claims.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use table_order_engine::{
    checkout_objects::StatusSource,
    db_types::OrderId,
    traits::{CatalogManagement, CheckoutManagement, OrderManagement, PaymentGateway},
    CheckoutApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::JwtClaims,
    config::ProxyConfig,
    data_objects::{
        CheckoutRequest,
        GatewayCallback,
        MergeItemsRequest,
        PaymentStatusRequest,
        PaymentStatusResponse,
        TableLocation,
        VersionInfo,
    },
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl [$($bounds:path),+] with [$($gateway:path),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B, G>(core::marker::PhantomData<fn() -> (B, G)>);}
        paste::paste! { impl<B, G> [<$name:camel Route>]<B, G> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> (B, G)>)
            }
        }}
        paste::paste! { impl<B, G> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B, G>
        where
            B: $($bounds +)+ 'static,
            G: $($gateway +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B, G>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl [$($bounds:path),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

#[get("/version")]
pub async fn version(db: web::Data<SqliteDatabase>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received version request");
    let sqlite_version = db.sqlite_version().await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    let info = VersionInfo { version: env!("CARGO_PKG_VERSION").to_string(), sqlite_version };
    Ok(HttpResponse::Ok().json(info))
}

//----------------------------------------------   Menu  ----------------------------------------------------
route!(menu => Get "/menu" impl [CatalogManagement]);
/// Route handler for the menu endpoint
///
/// Diners land here after scanning a table's QR code, which carries the `restaurant_id` and `table_id` query
/// parameters. Only active menu items are returned.
pub async fn menu<B: CatalogManagement>(
    claims: JwtClaims,
    query: web::Query<TableLocation>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let TableLocation { restaurant_id, table_id } = query.into_inner();
    debug!("💻️ GET menu for {restaurant_id}/{table_id} by {}", claims.user_id);
    let menu = api.fetch_menu(&restaurant_id, &table_id).await?;
    Ok(HttpResponse::Ok().json(menu))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(open_order => Post "/order" impl [CatalogManagement, OrderManagement]);
/// Opens a new, empty order at a table for the authenticated diner. Returns the new order id and the restaurant's
/// tax rate.
pub async fn open_order<B>(
    claims: JwtClaims,
    body: web::Json<TableLocation>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement + OrderManagement,
{
    let TableLocation { restaurant_id, table_id } = body.into_inner();
    debug!("💻️ POST order at {restaurant_id}/{table_id} for {}", claims.user_id);
    let result = api.open_order(&claims.user_id, &restaurant_id, &table_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(order_by_id => Get "/order/{order_id}" impl [OrderManagement, CheckoutManagement]);
pub async fn order_by_id<B>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CheckoutManagement,
{
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for {}", claims.user_id);
    let snapshot = api.get_order(&order_id, &claims.user_id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

route!(merge_items => Post "/order_items" impl [OrderManagement]);
/// Route handler for adding items to an order
///
/// The body carries the order id and an `order_list` of `{menu_id, quantity}` entries. Quantities are added to
/// whatever is already in the cart. The batch is applied atomically, or not at all.
pub async fn merge_items<B: OrderManagement>(
    claims: JwtClaims,
    body: web::Json<MergeItemsRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let order_id = request.order_id.clone();
    debug!("💻️ POST {} order items to {order_id} for {}", request.order_list.len(), claims.user_id);
    let lines = request.cart_lines();
    let result = api.merge_items(&order_id, &claims.user_id, &lines).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl [CheckoutManagement, OrderManagement] with [PaymentGateway]);
/// Route handler for the checkout endpoint
///
/// Computes the order's tax, opens a payment with the gateway and returns what the client needs to show the gateway's
/// payment page. A 503 means the gateway could not be reached and nothing was changed; the client may retry.
pub async fn checkout<B, G>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutManagement + OrderManagement,
    G: PaymentGateway,
{
    let order_id = body.into_inner().order_id;
    debug!("💻️ POST checkout for order {order_id} by {}", claims.user_id);
    let result = api.checkout(&order_id, &claims.user_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(payment_status => Post "/payment_status" impl [CheckoutManagement, OrderManagement] with [PaymentGateway]);
/// Asks the gateway how a payment is going and brings the local record up to date.
pub async fn payment_status<B, G>(
    claims: JwtClaims,
    body: web::Json<PaymentStatusRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutManagement + OrderManagement,
    G: PaymentGateway,
{
    let transaction_id = body.into_inner().transaction_id;
    debug!("💻️ POST payment_status for {transaction_id} by {}", claims.user_id);
    let payment_status = api.reconcile_payment_status(&transaction_id, &claims.user_id, StatusSource::Query).await?;
    Ok(HttpResponse::Ok().json(PaymentStatusResponse { payment_status }))
}

route!(gateway_callback => Post "/callback" impl [CheckoutManagement, OrderManagement] with [PaymentGateway]);
/// Route handler for the gateway's payment callback
///
/// The callback is signed, and the HMAC middleware has already checked it by the time it gets here, so the status it
/// carries is applied as-is.
pub async fn gateway_callback<B, G>(
    req: HttpRequest,
    body: web::Json<GatewayCallback>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutManagement + OrderManagement,
    G: PaymentGateway,
{
    let GatewayCallback { transaction_id, cust_id, status } = body.into_inner();
    let proxy = req.app_data::<web::Data<ProxyConfig>>().map(|p| *p.get_ref()).unwrap_or_default();
    let peer = get_remote_ip(&req, proxy);
    info!("💻️ Gateway callback from {peer:?}: transaction {transaction_id} is {status}");
    let payment_status =
        api.reconcile_payment_status(&transaction_id, &cust_id, StatusSource::Explicit(status)).await.map_err(|e| {
            warn!("💻️ Could not apply gateway callback for {transaction_id}. {e}");
            e
        })?;
    Ok(HttpResponse::Ok().json(PaymentStatusResponse { payment_status }))
}
