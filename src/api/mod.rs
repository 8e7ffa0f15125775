pub mod auth;
mod baskets;
mod comments;
pub mod error;
pub mod metrics;
mod orders;
mod payments;
mod phones;
mod users;
mod validation;
mod wishes;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/users/reg", post(auth::register))
        .route("/users/login", post(auth::login))
        .route("/phones", get(phones::list_phones))
        .route("/phones/:id", get(phones::get_phone))
        .route("/phones/:id/comments", get(phones::list_phone_comments));

    // Protected API routes
    let protected_routes = Router::new()
        // Users
        .route("/users", post(users::create_user))
        .route("/users/me", get(users::get_me))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/basket", get(users::get_user_basket))
        .route("/users/:id/orders", get(users::list_user_orders))
        .route("/users/:id/wishes", get(users::list_user_wishes))
        // Catalog
        .route("/phones", post(phones::create_phone))
        .route(
            "/phones/:id",
            patch(phones::update_phone).delete(phones::delete_phone),
        )
        // Orders
        .route("/orders", post(orders::create_order))
        .route(
            "/orders/:id",
            get(orders::get_order)
                .patch(orders::update_order_status)
                .delete(orders::delete_order),
        )
        .route(
            "/orders/:id/positions",
            post(orders::add_order_positions).delete(orders::remove_order_positions),
        )
        .route("/orders/:id/price", get(orders::get_order_price))
        .route("/orders/:id/payment", get(orders::get_order_payment))
        // Payments
        .route("/payments", post(payments::create_payment))
        .route(
            "/payments/:id",
            get(payments::get_payment)
                .patch(payments::update_payment)
                .delete(payments::delete_payment),
        )
        // Baskets
        .route("/baskets", post(baskets::create_basket))
        .route(
            "/baskets/:id",
            get(baskets::get_basket)
                .post(baskets::add_to_basket)
                .delete(baskets::remove_from_basket),
        )
        .route("/baskets/:id/price", get(baskets::get_basket_price))
        // Comments
        .route("/comments", post(comments::create_comment))
        .route("/comments/:id", delete(comments::delete_comment))
        .route("/comments/:id/rate", patch(comments::rate_comment))
        // Wishes
        .route("/wishes", post(wishes::create_wish))
        .route("/wishes/:id", delete(wishes::delete_wish))
        // Protected by auth
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_endpoint))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(middleware::from_fn(metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::Role;
    use crate::services::users::{create_account, AccountDetails};

    async fn test_state() -> Arc<AppState> {
        let mut config = Config::default();
        config.auth.jwt_secret = "test-secret".to_string();
        Arc::new(AppState::new(config, crate::db::test_pool().await))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn staff_token(state: &Arc<AppState>, app: &Router, role: Role) -> String {
        let email = format!("{}@shop.test", role);
        create_account(
            &state.db,
            AccountDetails {
                name: "Staff",
                email: &email,
                password: "staffpswd",
                phone_number: "5550100",
                role,
            },
        )
        .await
        .unwrap();
        login(app, &email, "staffpswd").await
    }

    async fn register(app: &Router, email: &str) -> (i64, String) {
        let (status, body) = send(
            app,
            "POST",
            "/api/users/reg",
            None,
            Some(json!({
                "name": "Pepe",
                "email": email,
                "password": "testpswd",
                "phone_number": "123123123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        let id = body["id"].as_i64().unwrap();
        (id, login(app, email, "testpswd").await)
    }

    async fn add_phone(app: &Router, token: &str, name: &str, price: i64) -> i64 {
        let (status, body) = send(
            app,
            "POST",
            "/api/phones",
            Some(token),
            Some(json!({
                "name": name,
                "producer_name": "CoolProducer",
                "os_name": "DOS",
                "ram_size": 16,
                "storage_size": 128,
                "camera_resolution": 20,
                "price": price
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "phone creation failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(test_state().await);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = create_router(test_state().await);

        let (status, body) = send(&app, "GET", "/api/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthorized");

        let (status, _) = send(&app, "GET", "/api/users/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "GET", "/api/phones", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phones"], json!([]));
    }

    #[tokio::test]
    async fn test_login_error_statuses() {
        let app = create_router(test_state().await);
        register(&app, "pepe@test.com").await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": "pepe@test.com", "password": "wrongpswd"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": "ghost@test.com", "password": "testpswd"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_registration_validation() {
        let app = create_router(test_state().await);

        let (status, body) = send(
            &app,
            "POST",
            "/api/users/reg",
            None,
            Some(json!({"name": "", "email": "nope", "password": "x", "phone_number": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert!(body["error"]["details"]["email"].is_array());

        register(&app, "pepe@test.com").await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/users/reg",
            None,
            Some(json!({
                "name": "Pepe",
                "email": "pepe@test.com",
                "password": "testpswd",
                "phone_number": "123123123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_catalog_writes_need_staff_role() {
        let state = test_state().await;
        let app = create_router(state.clone());
        let (_, customer) = register(&app, "pepe@test.com").await;
        let seller = staff_token(&state, &app, Role::Seller).await;

        let body = json!({
            "name": "CoolPhone",
            "producer_name": "CoolProducer",
            "os_name": "DOS",
            "ram_size": 16,
            "storage_size": 128,
            "camera_resolution": 20,
            "price": 100
        });
        let (status, _) = send(&app, "POST", "/api/phones", Some(&customer), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let phone_id = add_phone(&app, &seller, "CoolPhone", 100).await;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/phones/{}", phone_id),
            Some(&seller),
            Some(json!({"price": 150})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], 150);
        assert_eq!(body["name"], "CoolPhone");

        let (status, body) = send(&app, "GET", &format!("/api/phones/{}", phone_id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], 150);

        let (status, _) = send(&app, "DELETE", &format!("/api/phones/{}", phone_id), Some(&seller), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/api/phones/{}", phone_id), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_basket_flow() {
        let state = test_state().await;
        let app = create_router(state.clone());
        let (user_id, token) = register(&app, "pepe@test.com").await;
        let seller = staff_token(&state, &app, Role::Seller).await;
        let p1 = add_phone(&app, &seller, "P1", 100).await;

        let (status, basket) = send(&app, "GET", &format!("/api/users/{}/basket", user_id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(basket["positions"], json!([]));
        assert_eq!(basket["total_price"], 0);
        let basket_id = basket["id"].as_i64().unwrap();
        let basket_uri = format!("/api/baskets/{}", basket_id);

        send(&app, "POST", &basket_uri, Some(&token), Some(json!({"positions": [{"phone_id": p1, "quantity": 2}]}))).await;
        let (status, basket) = send(
            &app,
            "POST",
            &basket_uri,
            Some(&token),
            Some(json!({"positions": [{"phone_id": p1, "quantity": 3}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(basket["positions"].as_array().unwrap().len(), 1);
        assert_eq!(basket["positions"][0]["quantity"], 5);
        assert_eq!(basket["total_price"], 500);

        let (status, basket) = send(
            &app,
            "DELETE",
            &format!("{}?phoneids={}&amounts=2", basket_uri, p1),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(basket["positions"][0]["quantity"], 3);

        let (status, price) = send(&app, "GET", &format!("{}/price", basket_uri), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(price["total_price"], 300);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("{}?phoneids={},{}&amounts=2", basket_uri, p1, p1),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, basket) = send(&app, "DELETE", &basket_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(basket["positions"], json!([]));
    }

    #[tokio::test]
    async fn test_other_users_data_is_forbidden() {
        let state = test_state().await;
        let app = create_router(state.clone());
        let (pepe_id, _) = register(&app, "pepe@test.com").await;
        let (_, other) = register(&app, "other@test.com").await;
        let admin = staff_token(&state, &app, Role::Admin).await;

        let (status, _) = send(&app, "GET", &format!("/api/users/{}/basket", pepe_id), Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "GET", &format!("/api/users/{}/orders", pepe_id), Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "DELETE", &format!("/api/users/{}", pepe_id), Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, "DELETE", &format!("/api/users/{}", pepe_id), Some(&admin), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_order_payment_flow() {
        let state = test_state().await;
        let app = create_router(state.clone());
        let (user_id, token) = register(&app, "pepe@test.com").await;
        let seller = staff_token(&state, &app, Role::Seller).await;
        let p1 = add_phone(&app, &seller, "P1", 20000).await;

        let (status, order) = send(
            &app,
            "POST",
            "/api/orders",
            Some(&token),
            Some(json!({"address": "Moscow", "positions": [{"phone_id": p1, "quantity": 1}]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", order);
        assert_eq!(order["user_id"], user_id);
        assert_eq!(order["status"], "placed");
        assert_eq!(order["total_price"], 20000);
        let order_id = order["id"].as_i64().unwrap();

        let (status, payment) = send(&app, "POST", "/api/payments", Some(&token), Some(json!({"order_id": order_id}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payment["sum"], 20000);
        assert_eq!(payment["status"], true);

        let (status, _) = send(&app, "POST", "/api/payments", Some(&token), Some(json!({"order_id": order_id}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(&app, "PATCH", &format!("/api/phones/{}", p1), Some(&seller), Some(json!({"price": 25000}))).await;
        let (_, payment) = send(&app, "GET", &format!("/api/orders/{}/payment", order_id), Some(&token), None).await;
        assert_eq!(payment["sum"], 20000);
        let (_, price) = send(&app, "GET", &format!("/api/orders/{}/price", order_id), Some(&token), None).await;
        assert_eq!(price["total_price"], 25000);

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/orders/{}", order_id),
            Some(&token),
            Some(json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, order) = send(
            &app,
            "PATCH",
            &format!("/api/orders/{}", order_id),
            Some(&token),
            Some(json!({"status": "cancelled"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_seller_drives_customer_order() {
        let state = test_state().await;
        let app = create_router(state.clone());
        let (_, token) = register(&app, "pepe@test.com").await;
        let (_, other) = register(&app, "other@test.com").await;
        let seller = staff_token(&state, &app, Role::Seller).await;
        let p1 = add_phone(&app, &seller, "P1", 100).await;

        let (_, order) = send(
            &app,
            "POST",
            "/api/orders",
            Some(&token),
            Some(json!({"address": "Moscow", "positions": [{"phone_id": p1, "quantity": 1}]})),
        )
        .await;
        let order_uri = format!("/api/orders/{}", order["id"].as_i64().unwrap());

        let (status, order) = send(&app, "PATCH", &order_uri, Some(&seller), Some(json!({"status": "processing"}))).await;
        assert_eq!(status, StatusCode::OK, "{}", order);
        assert_eq!(order["status"], "processing");

        let (status, _) = send(&app, "PATCH", &order_uri, Some(&other), Some(json!({"status": "cancelled"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, order) = send(&app, "PATCH", &order_uri, Some(&seller), Some(json!({"status": "completed"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "completed");
    }

    #[tokio::test]
    async fn test_oversized_quantity_is_rejected() {
        let state = test_state().await;
        let app = create_router(state.clone());
        let (user_id, token) = register(&app, "pepe@test.com").await;
        let seller = staff_token(&state, &app, Role::Seller).await;
        let p1 = add_phone(&app, &seller, "P1", 100_000).await;

        let (_, basket) = send(&app, "GET", &format!("/api/users/{}/basket", user_id), Some(&token), None).await;
        let basket_uri = format!("/api/baskets/{}", basket["id"].as_i64().unwrap());

        let (status, body) = send(
            &app,
            "POST",
            &basket_uri,
            Some(&token),
            Some(json!({"positions": [{"phone_id": p1, "quantity": 1_000_000_000_000_000i64}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

        let (status, basket) = send(&app, "GET", &basket_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(basket["positions"], json!([]));
        assert_eq!(basket["total_price"], 0);
    }

    #[tokio::test]
    async fn test_comments_and_wishes() {
        let state = test_state().await;
        let app = create_router(state.clone());
        let (user_id, token) = register(&app, "pepe@test.com").await;
        let seller = staff_token(&state, &app, Role::Seller).await;
        let p1 = add_phone(&app, &seller, "P1", 100).await;

        let (status, comment) = send(
            &app,
            "POST",
            "/api/comments",
            Some(&token),
            Some(json!({"phone_id": p1, "text": "good"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let comment_id = comment["id"].as_i64().unwrap();

        let rate_uri = format!("/api/comments/{}/rate", comment_id);
        send(&app, "PATCH", &rate_uri, Some(&token), Some(json!({"liked": true}))).await;
        let (_, comment) = send(&app, "PATCH", &rate_uri, Some(&token), Some(json!({"liked": true}))).await;
        assert_eq!(comment["rate"], 2);

        let (status, comments) = send(&app, "GET", &format!("/api/phones/{}/comments", p1), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(comments.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "POST", "/api/wishes", Some(&token), Some(json!({"phone_id": p1}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&app, "POST", "/api/wishes", Some(&token), Some(json!({"phone_id": p1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "wish already exists");

        let (status, wishes) = send(&app, "GET", &format!("/api/users/{}/wishes", user_id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(wishes.as_array().unwrap().len(), 1);
    }
}
