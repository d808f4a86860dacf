use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use salespoint_api::app::services::AppServices;
use salespoint_api::app::{build_app, services};
use salespoint_api::config::AppConfig;
use salespoint_auth::store::CredentialStore;
use salespoint_auth::{SubscriptionStatus, TokenClaims, TokenRole};
use salespoint_core::EmailAddress;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: JWT_SECRET.to_string(),
            token_validity: ChronoDuration::days(7),
            database_url: None,
        };
        let app_services = Arc::new(services::build_services(&config).await.unwrap());
        let app = build_app(app_services.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services: app_services,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(id: Uuid, role: TokenRole, issued_secs_ago: i64, validity_secs: i64) -> String {
    let iat = Utc::now().timestamp() - issued_secs_ago;
    let claims = TokenClaims {
        id,
        email: "minted@example.com".to_string(),
        role,
        iat,
        exp: iat + validity_secs,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn employee_registration(email: &str, employee_id: &str) -> Value {
    json!({
        "email": email,
        "password": "Abc12345!",
        "first_name": "A",
        "last_name": "B",
        "employee_id": employee_id,
        "department": "Sales",
        "position": "Clerk",
    })
}

async fn register_admin(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    admin_id: &str,
    admin_level: &str,
) -> Value {
    let res = client
        .post(format!("{base_url}/api/auth/admin/register"))
        .json(&json!({
            "email": email,
            "password": "Abc12345!",
            "first_name": "Ada",
            "last_name": "Root",
            "admin_id": admin_id,
            "department": "IT",
            "position": "Sysadmin",
            "admin_level": admin_level,
            "access_level": "full_access",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_requires_a_token() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .get(format!("{}/api/auth/me", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("No token, authorization denied"));
}

#[tokio::test]
async fn employee_registration_grants_the_tier_defaults() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("e1@x.com", "EMP24001"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await.unwrap();
    let employee = &body["data"]["employee"];
    assert_eq!(
        employee["permissions"],
        json!(["view_dashboard", "view_customers", "view_products", "create_sales", "view_reports"])
    );
    assert_eq!(employee["employee_id"], json!("EMP24001"));
    // Credential material never leaves the API.
    assert!(employee.get("password").is_none());
    assert!(employee.get("password_hash").is_none());

    // The minted token resolves back to the same principal.
    let token = body["data"]["token"].as_str().unwrap();
    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["user"]["email"], json!("e1@x.com"));
}

#[tokio::test]
async fn fifth_failure_locks_and_the_correct_password_stays_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("locked@x.com", "EMP24002"))
        .send()
        .await
        .unwrap();

    for _ in 0..5 {
        let res = client
            .post(format!("{}/api/auth/employee/login", srv.base_url))
            .json(&json!({ "email": "locked@x.com", "password": "Wrong123!" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    // Sixth attempt, correct password: still locked.
    let res = client
        .post(format!("{}/api/auth/employee/login", srv.base_url))
        .json(&json!({ "email": "locked@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::LOCKED);
}

#[tokio::test]
async fn success_resets_the_failure_counter() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("reset@x.com", "EMP24003"))
        .send()
        .await
        .unwrap();

    for _ in 0..4 {
        client
            .post(format!("{}/api/auth/employee/login", srv.base_url))
            .json(&json!({ "email": "reset@x.com", "password": "Wrong123!" }))
            .send()
            .await
            .unwrap();
    }

    // Under the threshold: the correct password still works and resets.
    let res = client
        .post(format!("{}/api/auth/employee/login", srv.base_url))
        .json(&json!({ "email": "reset@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let record = srv
        .services
        .employees
        .find_by_email(&EmailAddress::parse("reset@x.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.account.failed_attempts, 0);
    assert!(record.account.last_login.is_some());
}

#[tokio::test]
async fn lapsed_subscription_is_payment_required_not_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/client/register", srv.base_url))
        .json(&json!({
            "email": "tenant@x.com",
            "password": "Abc12345!",
            "company_name": "Acme Retail",
            "contact_person": { "first_name": "Carol", "last_name": "Owner" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Lapse the subscription behind the API's back.
    let mut record = srv
        .services
        .clients
        .find_by_email(&EmailAddress::parse("tenant@x.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    record.subscription.status = SubscriptionStatus::Cancelled;
    srv.services.clients.update(record).await.unwrap();

    // Correct credentials, active account — still 402.
    let res = client
        .post(format!("{}/api/auth/client/login", srv.base_url))
        .json(&json!({ "email": "tenant@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);

    // And the previously issued token hits the same wall at the gate.
    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn expired_token_is_rejected_with_a_distinct_message() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Real principal, synthetic stale token: 1s validity, issued 2s ago.
    let res = client
        .post(format!("{}/api/auth/user/register", srv.base_url))
        .json(&json!({
            "email": "u1@x.com",
            "password": "Abc12345!",
            "first_name": "Ulla",
            "last_name": "Vee",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let id: Uuid = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();

    let stale = mint_jwt(id, TokenRole::User, 2, 1);
    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(stale)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], json!("Token has expired"));

    // Same claims, still-valid window: accepted.
    let fresh = mint_jwt(id, TokenRole::User, 0, 60);
    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(fresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn provisioning_is_admin_gated_and_generates_codes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = register_admin(&client, &srv.base_url, "root@x.com", "ADM24001", "super_admin").await;
    let admin_token = body["data"]["token"].as_str().unwrap().to_string();

    // Admin provisions an employee; the EMP code is generated server-side.
    let res = client
        .post(format!("{}/api/employees", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "email": "staff@x.com",
            "password": "Abc12345!",
            "first_name": "Stan",
            "last_name": "Field",
            "department": "Sales",
            "position": "Clerk",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let code = body["data"]["employee"]["employee_id"].as_str().unwrap();
    assert!(code.starts_with("EMP"));
    assert!(code.ends_with("0001"));

    // A second provisioned employee gets the next sequence.
    let res = client
        .post(format!("{}/api/employees", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "email": "staff2@x.com",
            "password": "Abc12345!",
            "first_name": "Sue",
            "last_name": "Field",
            "department": "Sales",
            "position": "Clerk",
        }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let code2 = body["data"]["employee"]["employee_id"].as_str().unwrap();
    assert!(code2.ends_with("0002"));

    // The employee's own token cannot reach the provisioning routes.
    let res = client
        .post(format!("{}/api/auth/employee/login", srv.base_url))
        .json(&json!({ "email": "staff@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let employee_token = body["data"]["token"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/employees", srv.base_url))
        .bearer_auth(&employee_token)
        .json(&json!({
            "email": "other@x.com",
            "password": "Abc12345!",
            "first_name": "O",
            "last_name": "T",
            "department": "Sales",
            "position": "Clerk",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_level_admin_gets_exactly_the_manager_tier() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = register_admin(&client, &srv.base_url, "mgr@x.com", "ADM24002", "manager").await;
    let permissions = body["data"]["admin"]["permissions"].as_array().unwrap();

    let expected = [
        "view_dashboard",
        "manage_customers",
        "manage_products",
        "manage_sales",
        "manage_inventory",
        "view_reports",
        "create_sales",
        "edit_sales",
        "delete_sales",
        "create_customers",
        "edit_customers",
        "delete_customers",
        "create_products",
        "edit_products",
        "delete_products",
        "manage_employees",
        "view_advanced_analytics",
        "export_data",
        "generate_reports",
    ];
    assert_eq!(permissions.len(), expected.len());
    for name in expected {
        assert!(
            permissions.iter().any(|p| p == name),
            "missing permission: {name}"
        );
    }
    // Admin-tier extras must not leak into the manager tier.
    assert!(!permissions.iter().any(|p| p == "manage_business_settings"));
}

#[tokio::test]
async fn super_admin_delete_guards_hold() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = register_admin(&client, &srv.base_url, "root@x.com", "ADM24001", "super_admin").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let self_id = body["data"]["admin"]["id"].as_str().unwrap().to_string();

    // Provision one super_admin and one regular admin.
    let res = client
        .post(format!("{}/api/admins", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "email": "root2@x.com",
            "password": "Abc12345!",
            "first_name": "Second",
            "last_name": "Root",
            "department": "IT",
            "position": "Sysadmin",
            "admin_level": "super_admin",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let super_id = body["data"]["admin"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["admin"]["admin_id"].as_str().unwrap().starts_with("ADM"));

    let res = client
        .post(format!("{}/api/admins", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "email": "plain@x.com",
            "password": "Abc12345!",
            "first_name": "Plain",
            "last_name": "Admin",
            "department": "Ops",
            "position": "Manager",
            "admin_level": "admin",
        }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let plain_id = body["data"]["admin"]["id"].as_str().unwrap().to_string();

    // Self-delete: blocked.
    let res = client
        .delete(format!("{}/api/admins/{}", srv.base_url, self_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Deleting a super_admin: blocked.
    let res = client
        .delete(format!("{}/api/admins/{}", srv.base_url, super_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Deleting a regular admin: allowed.
    let res = client
        .delete(format!("{}/api/admins/{}", srv.base_url, plain_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn session_route_works_with_and_without_a_principal() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Anonymous: not rejected, just unauthenticated.
    let res = client
        .get(format!("{}/api/auth/session", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["authenticated"], json!(false));

    // Garbage token degrades to anonymous instead of failing.
    let res = client
        .get(format!("{}/api/auth/session", srv.base_url))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["authenticated"], json!(false));

    // Real token attaches the principal.
    let reg: Value = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("sess@x.com", "EMP24004"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = reg["data"]["token"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/auth/session", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["authenticated"], json!(true));
    assert_eq!(body["data"]["role"], json!("employee"));
}

#[tokio::test]
async fn vendor_login_only_matches_vendor_accounts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/user/register", srv.base_url))
        .json(&json!({
            "email": "vendor@x.com",
            "password": "Abc12345!",
            "first_name": "Vera",
            "last_name": "Dor",
            "role": "vendor",
        }))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/api/auth/user/register", srv.base_url))
        .json(&json!({
            "email": "plain@x.com",
            "password": "Abc12345!",
            "first_name": "Paul",
            "last_name": "Lain",
        }))
        .send()
        .await
        .unwrap();

    let res = client
        .post(format!("{}/api/auth/vendor/login", srv.base_url))
        .json(&json!({ "email": "vendor@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/auth/vendor/login", srv.base_url))
        .json(&json!({ "email": "plain@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registrations_are_conflicts_with_field_errors_on_bad_input() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("dup@x.com", "EMP24005"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Same email.
    let res = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("dup@x.com", "EMP24006"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Same employee id, different email.
    let res = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("dup2@x.com", "EMP24005"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Weak password: 400 with per-field errors.
    let res = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&json!({
            "email": "weak@x.com",
            "password": "short",
            "first_name": "W",
            "last_name": "K",
            "employee_id": "EMP24007",
            "department": "Sales",
            "position": "Clerk",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn deactivated_principal_is_rejected_at_the_gate() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let reg: Value = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("gone@x.com", "EMP24008"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = reg["data"]["token"].as_str().unwrap().to_string();

    let mut record = srv
        .services
        .employees
        .find_by_email(&EmailAddress::parse("gone@x.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    record.account.is_active = false;
    srv.services.employees.update(record).await.unwrap();

    // Gate rejects the still-valid token.
    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Login reports the deactivation, not bad credentials.
    let res = client
        .post(format!("{}/api/auth/employee/login", srv.base_url))
        .json(&json!({ "email": "gone@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], json!("Account is deactivated"));
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let reg: Value = client
        .post(format!("{}/api/auth/employee/register", srv.base_url))
        .json(&employee_registration("pw@x.com", "EMP24009"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = reg["data"]["token"].as_str().unwrap().to_string();

    // Wrong current password.
    let res = client
        .put(format!("{}/api/auth/password", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "current_password": "Nope1234!", "new_password": "Fresh123!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Correct current password.
    let res = client
        .put(format!("{}/api/auth/password", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "current_password": "Abc12345!", "new_password": "Fresh123!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Old password is dead, new one logs in.
    let res = client
        .post(format!("{}/api/auth/employee/login", srv.base_url))
        .json(&json!({ "email": "pw@x.com", "password": "Abc12345!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/auth/employee/login", srv.base_url))
        .json(&json!({ "email": "pw@x.com", "password": "Fresh123!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
