use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use hyip_backend::{
    config::PlatformConfig,
    handlers,
    middlewares::AuthMiddleware,
    services::*,
    storage::Storage,
    utils::JwtService,
};

const ADMIN_PHONE: &str = "8000000001";

macro_rules! init_app {
    () => {{
        let storage = Storage::in_memory();
        let jwt_service = JwtService::new("integration-secret", 3600, 7200);
        let platform = PlatformConfig {
            admin_phones: vec![format!("+234{ADMIN_PHONE}")],
            ..PlatformConfig::default()
        };

        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt_service.clone()))
                .app_data(web::Data::new(AuthService::new(
                    storage.clone(),
                    jwt_service.clone(),
                    platform.clone(),
                )))
                .app_data(web::Data::new(UserService::new(storage.clone())))
                .app_data(web::Data::new(InvestmentService::new(storage.clone())))
                .app_data(web::Data::new(WithdrawalService::new(
                    storage.clone(),
                    platform.min_withdrawal,
                )))
                .app_data(web::Data::new(ReferralService::new(
                    storage.clone(),
                    platform.public_base_url.clone(),
                )))
                .service(
                    web::scope("/api/v1")
                        .configure(handlers::auth_config)
                        .configure(handlers::user_config)
                        .configure(handlers::investment_config)
                        .configure(handlers::withdrawal_config)
                        .configure(handlers::admin_config),
                ),
        )
        .await
    }};
}

/// 注册并返回 (access_token, 注册响应中的 user)
macro_rules! register {
    ($app:expr, $phone:expr, $referral:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({
                "phone_number": $phone,
                "password": "secret1",
                "name": "Test User",
                "referral_code": $referral,
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        assert_eq!(body["success"], true, "register failed: {body}");
        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["user"].clone(),
        )
    }};
}

macro_rules! call {
    ($app:expr, $method:ident, $uri:expr, $token:expr) => {{
        let req = test::TestRequest::$method()
            .uri($uri)
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
    ($app:expr, $method:ident, $uri:expr, $token:expr, $json:expr) => {{
        let req = test::TestRequest::$method()
            .uri($uri)
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json($json)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

#[actix_web::test]
async fn test_register_and_login() {
    let app = init_app!();
    let (_, user) = register!(app, "8012345678", Value::Null);
    assert_eq!(user["phone_number"], "+2348012345678");
    assert_eq!(user["balance"], 100_000);
    assert_eq!(user["is_admin"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"phone_number": "+2348012345678", "password": "secret1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"phone_number": "8012345678", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[actix_web::test]
async fn test_plans_are_public_and_profile_requires_token() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/investments/plans")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    let req = test::TestRequest::get().uri("/api/v1/user/profile").to_request();
    let err = test::try_call_service(&app, req).await.err().unwrap();
    assert_eq!(
        err.as_response_error().status_code(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_investment_confirmation_flow() {
    let app = init_app!();
    let (admin, admin_user) = register!(app, ADMIN_PHONE, Value::Null);
    assert_eq!(admin_user["is_admin"], true);
    let (token, _) = register!(app, "8012345678", Value::Null);

    // 金额必须与固定方案一致
    let (status, _) = call!(app, post, "/api/v1/investments", token, json!({"plan_id": "1", "amount": 150_000}));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call!(app, post, "/api/v1/investments", token, json!({"plan_id": "99", "amount": 200_000}));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call!(app, post, "/api/v1/investments", token, json!({"plan_id": "1", "amount": 200_000}));
    assert_eq!(status, StatusCode::OK);
    let payment_id = body["data"]["payment_id"].as_str().unwrap().to_string();

    // 普通用户不能访问管理接口
    let (status, _) = call!(app, get, "/api/v1/admin/payments", token);
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = call!(app, get, "/api/v1/admin/payments", admin);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/admin/payments/{payment_id}/confirm");
    let (status, body) = call!(app, post, &uri, admin);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["daily_earning"], 32_000);
    assert_eq!(body["data"]["total_return"], 960_000);

    // 重复确认找不到待确认记录
    let (status, _) = call!(app, post, &uri, admin);
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call!(app, get, "/api/v1/investments", token);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = call!(app, get, "/api/v1/user/profile", token);
    assert_eq!(body["data"]["user"]["balance"], 300_000);
    assert_eq!(body["data"]["user"]["total_invested"], 200_000);
    assert_eq!(body["data"]["portfolio"]["active_investments"], 1);

    let (status, body) = call!(app, post, "/api/v1/admin/accrual", admin);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 0);

    let (_, body) = call!(app, get, "/api/v1/admin/stats", admin);
    assert_eq!(body["data"]["total_users"], 2);
    assert_eq!(body["data"]["active_investments"], 1);
    assert_eq!(body["data"]["pending_payments"], 0);
}

#[actix_web::test]
async fn test_withdrawal_approval_flow() {
    let app = init_app!();
    let (admin, _) = register!(app, ADMIN_PHONE, Value::Null);
    let (token, _) = register!(app, "8012345678", Value::Null);

    let form = json!({
        "amount": 150_000,
        "bank_name": "Access Bank",
        "account_number": "0123456789",
        "account_name": "Ada Obi",
        "pin": "1234",
    });

    // 没有投资时不能提现
    let (status, _) = call!(app, post, "/api/v1/withdrawals", token, form.clone());
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call!(app, post, "/api/v1/investments", token, json!({"plan_id": "1", "amount": 200_000}));
    let payment_id = body["data"]["payment_id"].as_str().unwrap().to_string();
    let (status, _) = call!(app, post, &format!("/api/v1/admin/payments/{payment_id}/confirm"), admin);
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call!(app, post, "/api/v1/user/withdrawal-pin", token, json!({"pin": "1234", "confirm_pin": "1234"}));
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call!(app, post, "/api/v1/user/withdrawal-pin/verify", token, json!({"pin": "1234"}));
    assert_eq!(body["data"]["valid"], true);

    let (status, body) = call!(app, post, "/api/v1/withdrawals", token, form);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");
    let withdrawal_id = body["data"]["id"].as_str().unwrap().to_string();

    // 申请阶段不扣款
    let (_, body) = call!(app, get, "/api/v1/user/profile", token);
    assert_eq!(body["data"]["user"]["balance"], 300_000);

    let uri = format!("/api/v1/admin/withdrawals/{withdrawal_id}/approve");
    let (status, body) = call!(app, post, &uri, admin);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");

    let (_, body) = call!(app, get, "/api/v1/user/profile", token);
    assert_eq!(body["data"]["user"]["balance"], 150_000);

    // 已批准的申请不能再次审核
    let (status, _) = call!(app, post, &uri, admin);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = call!(app, get, "/api/v1/user/profile", token);
    assert_eq!(body["data"]["user"]["balance"], 150_000);

    let (_, body) = call!(app, get, "/api/v1/user/transactions", token);
    assert_eq!(body["data"]["pagination"]["total"], 2);
}

#[actix_web::test]
async fn test_referral_commission_on_confirmation() {
    let app = init_app!();
    let (admin, _) = register!(app, ADMIN_PHONE, Value::Null);
    let (referrer, referrer_user) = register!(app, "8010000001", Value::Null);
    let code = referrer_user["referral_code"].as_str().unwrap().to_string();
    let (token, referred_user) = register!(app, "8010000002", &code);
    assert_eq!(referred_user["referred_by"], referrer_user["id"]);

    let (_, body) = call!(app, post, "/api/v1/investments", token, json!({"plan_id": "4", "amount": 1_000_000}));
    let payment_id = body["data"]["payment_id"].as_str().unwrap().to_string();
    call!(app, post, &format!("/api/v1/admin/payments/{payment_id}/confirm"), admin);

    let (_, body) = call!(app, get, "/api/v1/user/profile", referrer);
    assert_eq!(body["data"]["user"]["referral_earnings"], 10_000);
    assert_eq!(body["data"]["user"]["balance"], 110_000);
    assert_eq!(body["data"]["user"]["total_referrals"], 1);

    let (_, body) = call!(app, get, "/api/v1/user/referrals", referrer);
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let (_, body) = call!(app, get, "/api/v1/user/referral-link", referrer);
    assert_eq!(
        body["data"]["link"],
        format!("http://localhost:8080/register?ref={code}")
    );
}

#[actix_web::test]
async fn test_password_reset_endpoints() {
    let app = init_app!();
    register!(app, "8012345678", Value::Null);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/send")
        .set_json(json!({"phone_number": "8099999999"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/send")
        .set_json(json!({"phone_number": "8012345678"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/verify")
        .set_json(json!({
            "phone_number": "8012345678",
            "code": "not-a-code",
            "new_password": "newpass",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
