use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use configs::AppConfig;
use models::notification::{Notification, NotificationInput};
use models::order::{Order, OrderInput, OrderStatus, OrderStatusUpdate};
use models::product::{Product, ProductInput};
use models::user::{UserData, UserInput};
use service::ledger::NotificationLedger;
use service::remote::RestClient;
use service::sync::ListSync;
use service::{EntityService, ListQuery, ServiceError};

use server::{routes, AppContext};

struct TestApp {
    base_url: String,
}

fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.normalize_and_validate().expect("valid test config");
    cfg
}

async fn start_server() -> anyhow::Result<TestApp> {
    let cfg = test_config();
    let ctx = AppContext::in_memory(&cfg);
    ctx.bootstrap(&cfg).await?;

    let app: Router = routes::build_router(Arc::new(ctx), CorsLayer::very_permissive());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().expect("reqwest client")
}

async fn rest_client(app: &TestApp) -> anyhow::Result<RestClient> {
    let rest = RestClient::new(app.base_url.clone(), Duration::from_secs(5))?;
    let session = rest.login("admin", "admin12345").await?;
    Ok(rest.with_token(session.token))
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_login_cookie_and_guard() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // no token at all
    let res = c.get(format!("{}/api/users", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // garbage bearer token
    let res = c.get(format!("{}/api/users", app.base_url)).bearer_auth("not-a-jwt").send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], 1004);

    let res = c
        .post(format!("{}/auth/login", app.base_url))
        .json(&json!({"username": "admin", "password": "wrong-password"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    let res = c
        .post(format!("{}/auth/login", app.base_url))
        .json(&json!({"username": "admin", "password": "admin12345"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let session: Value = res.json().await?;
    assert!(session["token"].as_str().is_some_and(|t| !t.is_empty()));

    // the cookie alone authenticates
    let res = c.get(format!("{}/auth/me", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let me: Value = res.json().await?;
    assert_eq!(me["username"], "admin");

    let profile: Value = c.get(format!("{}/api/profile", app.base_url)).send().await?.json().await?;
    assert!(profile["last_login"].is_string());

    let res = c.post(format!("{}/auth/logout", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn e2e_users_crud_through_rest_service() -> anyhow::Result<()> {
    let app = start_server().await?;
    let users = rest_client(&app).await?.resource::<UserData, UserInput>("users");

    let page = users.list(&ListQuery::new(10)).await?;
    assert_eq!(page.total, 10);
    assert_eq!(page.items.len(), 10);

    let err = users.list(&ListQuery::new(10).with_filter("shoe_size", "42")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let input = UserInput {
        name: "Tran Thi Mai".into(),
        username: "maitran".into(),
        email: "mai@example.com".into(),
        phone: String::new(),
        website: String::new(),
    };
    let created = users.create(input.clone()).await?;
    assert_eq!(created.id, 11);
    assert_eq!(users.get(&11).await?.username, "maitran");

    let bad = users.create(UserInput { email: "nope".into(), ..input.clone() }).await.unwrap_err();
    assert!(matches!(bad, ServiceError::Validation(_)));

    let updated = users.update(&11, UserInput { name: "Mai Tran".into(), ..input }).await?;
    assert_eq!(updated.name, "Mai Tran");

    users.delete(&11).await?;
    users.delete(&11).await?;
    assert!(matches!(users.get(&11).await, Err(ServiceError::NotFound(_))));
    assert_eq!(users.list(&ListQuery::new(10)).await?.total, 10);
    Ok(())
}

#[tokio::test]
async fn e2e_product_search_and_paging() -> anyhow::Result<()> {
    let app = start_server().await?;
    let products = rest_client(&app).await?.resource::<Product, ProductInput>("products");

    let found = products.list(&ListQuery::new(10).with_search("LAP")).await?;
    assert!(found.total >= 2);
    assert!(found.items.iter().any(|p| p.name == "Laptop ABC"));

    let second = products.list(&ListQuery::new(5).with_page(3)).await?;
    assert_eq!(second.total, 12);
    assert_eq!(second.items.len(), 2);

    let beyond = products.list(&ListQuery::new(5).with_page(9)).await?;
    assert_eq!(beyond.total, 12);
    assert!(beyond.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_order_list_sync_over_rest() -> anyhow::Result<()> {
    let app = start_server().await?;
    let orders = rest_client(&app).await?.resource::<Order, OrderInput>("orders");
    let list = ListSync::for_service(Arc::new(orders), ListQuery::new(10));

    assert!(list.reload().await.is_applied());
    assert_eq!(list.state().total, 20);

    list.set_page(2).await;
    assert_eq!(list.state().query.page, 2);

    assert!(list.set_filter("status", "cancelled").await.is_applied());
    let s = list.state();
    assert_eq!(s.total, 3);
    assert_eq!(s.query.page, 1);
    assert_eq!(s.items.len(), 3);
    assert!(s.items.iter().all(|o| o.status == OrderStatus::Cancelled));

    let target = s.items[0].id;
    let reopened = list
        .update_status(target, OrderStatusUpdate { status: OrderStatus::Pending, note: Some("customer called back".into()) })
        .await?;
    assert_eq!(reopened.status, OrderStatus::Pending);
    assert_eq!(list.state().total, 2);

    // unknown filter: error is kept, last good page stays
    list.set_filter("warehouse", "north").await;
    let s = list.state();
    assert!(s.error.is_some());
    assert_eq!(s.total, 2);
    Ok(())
}

#[tokio::test]
async fn e2e_notification_ledger_over_rest() -> anyhow::Result<()> {
    let app = start_server().await?;
    let notifications = rest_client(&app).await?.resource::<Notification, NotificationInput>("notifications");
    let ledger = NotificationLedger::new(Arc::new(notifications), 10);

    assert!(ledger.load().await.is_applied());
    let ids: Vec<String> = ledger.state().items.into_iter().map(|n| n.id).collect();
    assert_eq!(ids, ["1", "2", "3", "4"]);
    assert_eq!(ledger.unread_count(), 2);

    ledger.mark_as_read("1").await?;
    assert_eq!(ledger.unread_count(), 1);

    ledger.delete("3").await?;
    assert_eq!(ledger.unread_count(), 1);
    assert_eq!(ledger.state().items.len(), 3);

    ledger.mark_all_as_read().await?;
    assert_eq!(ledger.unread_count(), 0);
    assert!(ledger.state().items.iter().all(|n| n.read));

    // reload agrees with the locally maintained counter
    ledger.load().await;
    assert_eq!(ledger.unread_count(), 0);
    assert_eq!(ledger.state().total, 3);
    Ok(())
}

#[tokio::test]
async fn e2e_settings_profile_and_preferences() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c
        .post(format!("{}/auth/login", app.base_url))
        .json(&json!({"username": "admin", "password": "admin12345"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let before: Value = c.get(format!("{}/api/settings", app.base_url)).send().await?.json().await?;
    let mut general = before["general"].clone();
    general["site_name"] = json!("Shop Admin");
    let res = c.put(format!("{}/api/settings", app.base_url)).json(&json!({"general": general})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let after: Value = res.json().await?;
    assert_eq!(after["general"]["site_name"], "Shop Admin");
    assert_eq!(after["security"], before["security"]);

    let res = c
        .post(format!("{}/api/profile/password", app.base_url))
        .json(&json!({"current_password": "admin12345", "new_password": "Str0ng!pass", "confirm_password": "Str0ng!pas"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c
        .post(format!("{}/api/profile/password", app.base_url))
        .json(&json!({"current_password": "admin12345", "new_password": "Str0ng!pass", "confirm_password": "Str0ng!pass"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = client()
        .post(format!("{}/auth/login", app.base_url))
        .json(&json!({"username": "admin", "password": "Str0ng!pass"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let prefs: Value = c.post(format!("{}/api/preferences/theme/toggle", app.base_url)).send().await?.json().await?;
    assert_eq!(prefs["theme"], "dark");

    let stats: Value = c.get(format!("{}/api/dashboard/stats", app.base_url)).send().await?.json().await?;
    assert_eq!(stats["total_users"], 10);
    assert_eq!(stats["total_orders"], 20);
    let sales: Vec<Value> = c.get(format!("{}/api/dashboard/sales?days=7", app.base_url)).send().await?.json().await?;
    assert_eq!(sales.len(), 7);
    Ok(())
}
