//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Liveness banner
//! GET  /health, /health/ready              - Health checks
//!
//! # Accounts
//! POST /users/signup, /users/login         - Customer signup and login (rate limited)
//! GET  /users/user/{id}, /users/me         - Profile with address
//! PUT  /users/user/{id}/address            - Upsert address
//! POST /admin/login                        - Admin login (rate limited)
//! POST /admin/add, GET /admin/all, ...     - Admin account and customer management
//! GET  /admin/dashboard                    - Store counters
//!
//! # Addresses
//! POST|PUT /addresses/users/{userId}       - Upsert address
//! GET  /addresses/get-users/{userId}       - Get address
//! GET  /addresses/getAllAddress            - All addresses (admin)
//! DELETE /addresses/del-users/{userId}     - Delete address
//!
//! # Catalog and reviews
//! /api/product/*                           - Product CRUD, cached listing
//! /api/review/*                            - Reviews and rating summaries
//!
//! # Shopping
//! /api/cart/*, /api/cartItem/*             - Carts and cart items
//! /api/order/*, /api/orderItem/*           - Checkout and order management
//! POST /api/payment/create-payment         - PayMongo payment link
//!
//! # Services
//! /appointments/*                          - Grooming and boarding bookings
//! ```

pub mod addresses;
pub mod admin;
pub mod appointments;
pub mod cart_items;
pub mod carts;
pub mod health;
pub mod order_items;
pub mod orders;
pub mod payment;
pub mod products;
pub mod reviews;
pub mod users;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::middleware::auth_rate_limiter;
use crate::models::product::MAX_IMAGE_LEN;
use crate::state::AppState;

/// Body of simple acknowledgement responses.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `{"message": ...}` response.
pub fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.into(),
    })
}

/// Create the customer account routes router.
pub fn user_routes() -> Router<AppState> {
    let credentials = Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(credentials)
        .route("/me", get(users::me))
        .route("/user/{id}", get(users::get_user))
        .route("/user/{id}/address", put(users::put_address))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}",
            post(addresses::upsert).put(addresses::upsert),
        )
        .route("/get-users/{user_id}", get(addresses::get))
        .route("/getAllAddress", get(addresses::list))
        .route(
            "/del-users/{user_id}",
            axum::routing::delete(addresses::delete),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/postProduct", post(products::create))
        .route("/getProduct", get(products::list))
        .route("/getProduct/{id}", get(products::get))
        .route("/putProduct/{id}", put(products::update))
        .route(
            "/deleteProduct/{id}",
            axum::routing::delete(products::delete),
        )
        .route("/getTotalQuantitySold", get(products::total_quantity_sold))
        // Product images arrive inline as base64 strings
        .layer(DefaultBodyLimit::max(MAX_IMAGE_LEN + 64 * 1024))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/postCartRecord", post(carts::create))
        .route("/getAllCarts", get(carts::list))
        .route("/getCartById/{cart_id}", get(carts::get))
        .route("/getCartSummary/{cart_id}", get(carts::summary))
        .route(
            "/deleteCartDetails/{cart_id}",
            axum::routing::delete(carts::clear),
        )
}

/// Create the cart item routes router.
pub fn cart_item_routes() -> Router<AppState> {
    Router::new()
        .route("/postCartItem", post(cart_items::add))
        .route("/getAllCartItems", get(cart_items::list))
        .route("/updateCartItem/{id}", put(cart_items::update))
        .route("/systemUpdateCartItem/{id}", put(cart_items::system_update))
        .route(
            "/deleteCartItem/{id}",
            axum::routing::delete(cart_items::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/postOrderRecord", post(orders::create))
        .route("/getAllOrders", get(orders::list))
        .route("/getOrderDetails/{id}", get(orders::get))
        .route("/getAllOrdersByUserId", get(orders::list_by_user))
        .route("/get-total-income", get(orders::total_income))
        .route("/putOrderDetails", put(orders::update))
        .route("/updateStatus/{id}", put(orders::update_status))
        .route(
            "/deleteOrderDetails/{id}",
            axum::routing::delete(orders::delete),
        )
}

/// Create the order item routes router.
pub fn order_item_routes() -> Router<AppState> {
    Router::new()
        .route("/getAllOrdersItem", get(order_items::list))
        .route("/putOrderItemDetails", put(order_items::update))
        .route("/updateIsRated/{id}", put(order_items::update_is_rated))
        .route(
            "/deleteOrderItemDetails/{id}",
            axum::routing::delete(order_items::delete),
        )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/postReview", post(reviews::create))
        .route("/getReview", get(reviews::list))
        .route("/getReview/{id}", get(reviews::get))
        .route("/putReview/{id}", put(reviews::update))
        .route("/deleteReview/{id}", axum::routing::delete(reviews::delete))
        .route(
            "/getReviewsByProductId/{product_id}",
            get(reviews::by_product),
        )
        .route(
            "/getRatingSummary/{product_id}",
            get(reviews::rating_summary),
        )
}

/// Create the appointment routes router.
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/getAppointment", get(appointments::list))
        .route("/postAppointment", post(appointments::create))
        .route("/putAppointment/{id}", put(appointments::update))
        .route(
            "/deleteAppointment/{id}",
            axum::routing::delete(appointments::delete),
        )
        .route("/cancel/{id}", put(appointments::cancel))
        .route("/confirm/{id}", put(appointments::confirm))
        .route("/byUserEmail/{email}", get(appointments::by_email))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    let credentials = Router::new()
        .route("/login", post(admin::login))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(credentials)
        .route("/add", post(admin::add))
        .route("/all", get(admin::all))
        .route("/update/{user_id}", put(admin::update))
        .route("/delete/{user_id}", axum::routing::delete(admin::delete))
        .route("/dashboard", get(admin::dashboard))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/create-payment", post(payment::create_payment))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/users", user_routes())
        .nest("/addresses", address_routes())
        .nest("/admin", admin_routes())
        .nest("/appointments", appointment_routes())
        .nest("/api/product", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/cartItem", cart_item_routes())
        .nest("/api/order", order_routes())
        .nest("/api/orderItem", order_item_routes())
        .nest("/api/review", review_routes())
        .nest("/api/payment", payment_routes())
}
