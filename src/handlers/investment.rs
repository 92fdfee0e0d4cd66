use super::current_user_id;
use crate::error::AppError;
use crate::models::*;
use crate::services::InvestmentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/investments/plans",
    tag = "investment",
    responses(
        (status = 200, description = "投资方案列表", body = [InvestmentPlan])
    )
)]
pub async fn list_plans(investment_service: web::Data<InvestmentService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(investment_service.plans())))
}

#[utoipa::path(
    post,
    path = "/investments",
    tag = "investment",
    request_body = CreateInvestmentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已提交存款，等待管理员确认", body = CreateInvestmentResponse),
        (status = 400, description = "金额不在方案范围内"),
        (status = 404, description = "方案不存在")
    )
)]
pub async fn create_investment(
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
    request: web::Json<CreateInvestmentRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let request = request.into_inner();

    let Some(plan) = investment_service.find_plan(&request.plan_id).cloned() else {
        return Ok(AppError::NotFound("Plan not found".to_string()).error_response());
    };
    if !plan.accepts(request.amount) {
        return Ok(AppError::ValidationError(format!(
            "Amount must be between {} and {} kobo for this plan",
            plan.min_amount, plan.max_amount
        ))
        .error_response());
    }

    match investment_service
        .create_investment(&user_id, &plan.id, request.amount)
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            CreateInvestmentResponse {
                payment_id: payment.id,
                amount: payment.amount,
                plan,
            },
            "Payment submitted, awaiting confirmation",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/investments",
    tag = "investment",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的投资", body = [InvestmentResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_investments(
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match investment_service.list_user_investments(&user_id).await {
        Ok(investments) => {
            let investments: Vec<InvestmentResponse> =
                investments.into_iter().map(InvestmentResponse::from).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(investments)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn investment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/investments")
            .route("", web::post().to(create_investment))
            .route("", web::get().to(list_investments))
            .route("/plans", web::get().to(list_plans)),
    );
}
