use crate::app::{
    AuctionUseCase, AuthUseCase, MemberUseCase, PaymentUseCase, ProductUseCase, ProfileUpdate,
};
use crate::domain::{AuthProvider, Member, MemberRole, ProductCategory, ProductCondition};
use crate::error::{DomainError, PlatformError};
use crate::storage::Storage;
use axum::{
    extract::Path,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Json as AxumJson, Router,
};
use chrono::{DateTime, Utc};
use hyper::Server;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::error;
use uuid::Uuid;

// GraphQL imports
use crate::graphql::{create_schema, GraphQLSchema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};

/// Shared application state handed to every handler.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub auth: Arc<AuthUseCase>,
    pub members: Arc<MemberUseCase>,
    pub products: Arc<ProductUseCase>,
    pub auctions: Arc<AuctionUseCase>,
    pub payments: Arc<PaymentUseCase>,
}

/// Error wrapper mapping domain errors onto `{code, message}` bodies with
/// their HTTP status; everything else becomes an opaque 500.
pub struct ApiError(PlatformError);

impl<E: Into<PlatformError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            PlatformError::Domain(e) => {
                let status =
                    StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
                (status, Json(json!({ "code": e.code(), "message": e.to_string() })))
                    .into_response()
            }
            other => {
                error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "code": 9000, "message": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "rarebid",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus text exposition of every counter the service records
async fn metrics_endpoint() -> impl IntoResponse {
    crate::observability::metrics::render()
}

/// GraphQL handler (supports GET and POST)
async fn graphql_handler(
    Extension(schema): Extension<GraphQLSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

/// GraphiQL UI (pinned CDN versions to avoid upstream breaking changes)
async fn graphiql() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>GraphiQL</title>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/graphiql@2.7.5/graphiql.min.css" />
    <style>html, body, #graphiql { height: 100%; margin: 0; width: 100%; }</style>
  </head>
  <body>
    <div id="graphiql"></div>
    <script src="https://cdn.jsdelivr.net/npm/react@18/umd/react.production.min.js" crossorigin="anonymous"></script>
    <script src="https://cdn.jsdelivr.net/npm/react-dom@18/umd/react-dom.production.min.js" crossorigin="anonymous"></script>
    <script src="https://cdn.jsdelivr.net/npm/graphiql@2.7.5/graphiql.min.js" crossorigin="anonymous"></script>
    <script>
      const fetcher = GraphiQL.createFetcher({ url: '/graphql' });
      ReactDOM.createRoot(document.getElementById('graphiql'))
        .render(React.createElement(GraphiQL, { fetcher }));
    </script>
  </body>
</html>"#
        .to_string(),
    )
}

// ---- auth helpers ------------------------------------------------------

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn authenticated(state: &AppState, headers: &HeaderMap) -> ApiResult<Member> {
    let token = bearer_token(headers).ok_or(DomainError::Unauthorized)?;
    Ok(state.auth.authenticate(token).await?)
}

fn member_json(member: &Member) -> serde_json::Value {
    json!({
        "public_id": member.public_id,
        "username": member.username,
        "role": crate::app::auth_use_case::role_name(member.role),
        "real_name": member.real_name,
        "contact_phone": member.contact_phone,
        "zip_code": member.zip_code,
        "address": member.address,
        "address_detail": member.address_detail,
        "intro": member.intro,
        "created_at": member.created_at,
    })
}

fn parse_provider(value: &str) -> ApiResult<AuthProvider> {
    match value.to_ascii_uppercase().as_str() {
        "KAKAO" => Ok(AuthProvider::Kakao),
        "GOOGLE" => Ok(AuthProvider::Google),
        other => Err(DomainError::InvalidInput(format!("unknown provider '{other}'")).into()),
    }
}

fn parse_category(value: &str) -> ApiResult<ProductCategory> {
    match value.to_ascii_uppercase().as_str() {
        "FIGURE" => Ok(ProductCategory::Figure),
        "MODEL_KIT" => Ok(ProductCategory::ModelKit),
        "TRADING_CARD" => Ok(ProductCategory::TradingCard),
        "PLUSH" => Ok(ProductCategory::Plush),
        "GAME" => Ok(ProductCategory::Game),
        "ETC" => Ok(ProductCategory::Etc),
        other => Err(DomainError::InvalidInput(format!("unknown category '{other}'")).into()),
    }
}

fn parse_condition(value: &str) -> ApiResult<ProductCondition> {
    match value.to_ascii_uppercase().as_str() {
        "MISB" => Ok(ProductCondition::Misb),
        "NISB" => Ok(ProductCondition::Nisb),
        "MISP" => Ok(ProductCondition::Misp),
        "USED" => Ok(ProductCondition::Used),
        other => Err(DomainError::InvalidInput(format!("unknown condition '{other}'")).into()),
    }
}

// ---- request bodies ----------------------------------------------------

#[derive(Deserialize)]
struct LoginRequest {
    provider: String,
    provider_id: String,
    username: String,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Deserialize)]
struct LogoutRequest {
    refresh_token: String,
}

#[derive(Deserialize, Default)]
struct UpdateProfileRequest {
    username: Option<String>,
    real_name: Option<String>,
    contact_phone: Option<String>,
    zip_code: Option<String>,
    address: Option<String>,
    address_detail: Option<String>,
    intro: Option<String>,
}

#[derive(Deserialize)]
struct CreateProductRequest {
    name: String,
    description: String,
    category: String,
    condition: String,
}

#[derive(Deserialize)]
struct UpdateProductRequest {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct InspectionRequest {
    approved: bool,
    comment: Option<String>,
}

#[derive(Deserialize)]
struct PresignImageRequest {
    filename: String,
    content_type: String,
}

#[derive(Deserialize)]
struct AttachImageRequest {
    object_key: String,
}

#[derive(Deserialize)]
struct CreateAuctionRequest {
    product_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    start_price: i64,
    tick_size: i64,
}

#[derive(Deserialize)]
struct BidRequest {
    amount: i64,
}

#[derive(Deserialize)]
struct TopUpRequest {
    amount: i64,
}

#[derive(Deserialize)]
struct ConfirmTopUpRequest {
    order_id: String,
    payment_key: String,
    amount: i64,
}

#[derive(Deserialize)]
struct RefundRequest {
    order_id: String,
    reason: String,
}

// ---- auth --------------------------------------------------------------

async fn login(
    Extension(state): Extension<Arc<AppState>>,
    AxumJson(req): AxumJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let provider = parse_provider(&req.provider)?;
    let pair = state
        .auth
        .login(provider, &req.provider_id, &req.username)
        .await?;
    Ok(Json(json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

async fn refresh(
    Extension(state): Extension<Arc<AppState>>,
    AxumJson(req): AxumJson<RefreshRequest>,
) -> ApiResult<impl IntoResponse> {
    let pair = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(json!({
        "access_token": pair.access_token,
        "refresh_token": pair.refresh_token,
    })))
}

async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    AxumJson(req): AxumJson<LogoutRequest>,
) -> ApiResult<impl IntoResponse> {
    let access = bearer_token(&headers).ok_or(DomainError::Unauthorized)?;
    state.auth.logout(access, &req.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn promote_seller(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let promoted = state.auth.promote_seller(&member.public_id).await?;
    Ok(Json(member_json(&promoted)))
}

// ---- members -----------------------------------------------------------

async fn me(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    Ok(Json(member_json(&member)))
}

async fn update_me(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    AxumJson(req): AxumJson<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let updated = state
        .members
        .update_profile(
            &member.public_id,
            ProfileUpdate {
                username: req.username,
                real_name: req.real_name,
                contact_phone: req.contact_phone,
                zip_code: req.zip_code,
                address: req.address,
                address_detail: req.address_detail,
                intro: req.intro,
            },
        )
        .await?;
    Ok(Json(member_json(&updated)))
}

async fn withdraw_me(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    state.members.withdraw(&member.public_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn my_participation(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    state.members.verify_participation(&member.public_id).await?;
    Ok(Json(json!({ "eligible": true })))
}

// ---- products ----------------------------------------------------------

async fn create_product(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    AxumJson(req): AxumJson<CreateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let category = parse_category(&req.category)?;
    let condition = parse_condition(&req.condition)?;
    let product = state
        .products
        .create(&member, &req.name, &req.description, category, condition)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let product = state.products.get(id).await?;
    let images = state.products.image_urls(id).await?;
    Ok(Json(json!({ "product": product, "image_urls": images })))
}

async fn update_product(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    AxumJson(req): AxumJson<UpdateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let product = state
        .products
        .update(&member, id, req.name, req.description)
        .await?;
    Ok(Json(product))
}

async fn delete_product(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    state.products.delete(&member, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn presign_product_image(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    AxumJson(req): AxumJson<PresignImageRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let upload = state
        .products
        .presign_image(&member, id, &req.filename, &req.content_type)
        .await?;
    Ok(Json(json!({
        "upload_url": upload.upload_url,
        "object_key": upload.object_key,
        "expires_at": upload.expires_at,
    })))
}

async fn attach_product_image(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    AxumJson(req): AxumJson<AttachImageRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let image = state.products.attach_image(&member, id, &req.object_key).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

async fn record_inspection(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    AxumJson(req): AxumJson<InspectionRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let inspection = state
        .products
        .record_inspection(&member, id, req.approved, req.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(inspection)))
}

async fn list_products_awaiting_inspection(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    if member.role != MemberRole::Admin {
        return Err(DomainError::Forbidden.into());
    }
    let products = state.products.list_awaiting_inspection().await?;
    Ok(Json(products))
}

// ---- auctions ----------------------------------------------------------

async fn create_auction(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    AxumJson(req): AxumJson<CreateAuctionRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let auction = state
        .auctions
        .create_auction(
            &member,
            req.product_id,
            req.start_time,
            req.end_time,
            req.start_price,
            req.tick_size,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

async fn place_bid(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    AxumJson(req): AxumJson<BidRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let bid = state.auctions.place_bid(&member, id, req.amount).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

async fn add_bookmark(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let bookmark = state.auctions.add_bookmark(&member, id).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

async fn remove_bookmark(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let removed = state.auctions.remove_bookmark(&member, id).await?;
    Ok(Json(json!({ "removed": removed })))
}

async fn list_bookmarks(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let bookmarks = state.auctions.list_bookmarks(&member).await?;
    Ok(Json(bookmarks))
}

async fn pay_order(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let order = state.payments.pay_order(&member, id).await?;
    Ok(Json(order))
}

// ---- payments ----------------------------------------------------------

async fn request_top_up(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    AxumJson(req): AxumJson<TopUpRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let payment = state.payments.request_top_up(&member, req.amount).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn confirm_top_up(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    AxumJson(req): AxumJson<ConfirmTopUpRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let payment = state
        .payments
        .confirm_top_up(&member, &req.order_id, &req.payment_key, req.amount)
        .await?;
    Ok(Json(payment))
}

async fn refund_top_up(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    AxumJson(req): AxumJson<RefundRequest>,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let payment = state
        .payments
        .refund_top_up(&member, &req.order_id, &req.reason)
        .await?;
    Ok(Json(payment))
}

async fn my_wallet(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let wallet = state.payments.my_wallet(&member).await?;
    Ok(Json(json!({
        "balance": wallet.balance,
        "holding": wallet.holding,
        "available": wallet.available(),
    })))
}

async fn my_transactions(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let txs = state.payments.my_transactions(&member).await?;
    Ok(Json(txs))
}

async fn my_settlements(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let member = authenticated(&state, &headers).await?;
    let settlements = state.payments.my_settlements(&member).await?;
    Ok(Json(settlements))
}

// ---- admin task endpoints ---------------------------------------------

async fn admin_settle_auctions(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let now = Utc::now();
    let started = state.auctions.start_due_auctions(now).await?;
    let summary = state.auctions.settle_expired(now).await?;
    Ok(Json(json!({
        "started": started,
        "settled": summary.settled,
        "failed_lots": summary.failed_lots,
        "errors": summary.errors,
    })))
}

async fn admin_process_settlements(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let paid = state.payments.process_settlements(Utc::now()).await?;
    Ok(Json(json!({ "paid": paid })))
}

async fn admin_payment_timeouts(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let processed = state.payments.process_payment_timeouts(Utc::now()).await?;
    Ok(Json(json!({ "processed": processed })))
}

/// Create the HTTP server with all routes, including GraphQL
pub fn create_server(state: Arc<AppState>, objects_root: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let schema = create_schema(
        state.storage.clone(),
        // the product use case owns the object store; schema gets its own handle
        state.products.objects_handle(),
    );

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        // Serve locally stored product images
        .nest_service("/objects", ServeDir::new(objects_root))
        // GraphQL endpoints
        .route("/graphql", post(graphql_handler).get(graphql_handler))
        .route("/graphiql", get(graphiql))
        .layer(Extension(schema))
        // Auth
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/promote-seller", post(promote_seller))
        // Members
        .route(
            "/api/members/me",
            get(me).put(update_me).delete(withdraw_me),
        )
        .route("/api/members/me/participation", get(my_participation))
        // Products
        .route("/api/products", post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/:id/images/presign", post(presign_product_image))
        .route("/api/products/:id/images", post(attach_product_image))
        .route("/api/products/:id/inspection", post(record_inspection))
        .route("/api/inspections/pending", get(list_products_awaiting_inspection))
        // Auctions
        .route("/api/auctions", post(create_auction))
        .route("/api/auctions/:id/bids", post(place_bid))
        .route(
            "/api/auctions/:id/bookmark",
            post(add_bookmark).delete(remove_bookmark),
        )
        .route("/api/bookmarks", get(list_bookmarks))
        .route("/api/auctions/:id/pay", post(pay_order))
        // Payments
        .route("/api/payments/top-ups", post(request_top_up))
        .route("/api/payments/top-ups/confirm", post(confirm_top_up))
        .route("/api/payments/top-ups/refund", post(refund_top_up))
        .route("/api/wallet", get(my_wallet))
        .route("/api/wallet/transactions", get(my_transactions))
        .route("/api/settlements", get(my_settlements))
        // Operational task endpoints
        .route("/admin/settle-auctions", post(admin_settle_auctions))
        .route("/admin/process-settlements", post(admin_process_settlements))
        .route("/admin/payment-timeouts", post(admin_payment_timeouts))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    state: Arc<AppState>,
    objects_root: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state, objects_root);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("🔎 GraphQL:      http://localhost:{port}/graphql");
    println!("🧪 GraphiQL UI:  http://localhost:{port}/graphiql");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
