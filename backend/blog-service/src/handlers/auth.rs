/// Account handlers - signup and login
use crate::error::Result;
use crate::forms::{LoginForm, SignupForm};
use crate::services::AuthService;
use actix_web::{web, HttpResponse};

/// Create an account and return a token pair
/// POST /api/v1/auth/signup
pub async fn signup(
    service: web::Data<AuthService>,
    form: web::Json<SignupForm>,
) -> Result<HttpResponse> {
    let response = service.signup(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Exchange credentials for a token pair
/// POST /api/v1/auth/login
pub async fn login(
    service: web::Data<AuthService>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse> {
    let response = service.login(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
