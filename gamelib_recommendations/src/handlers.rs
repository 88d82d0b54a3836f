use std::sync::Arc;

use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{api_v2_operation, web};

use gamelib_repository::api::UserId;

use crate::recommendations_repository::{
    RecommendationsRepository, RecommendationsRepositoryError,
};

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_recommendations_for_user(
    recommendations_repository: Data<Arc<dyn RecommendationsRepository>>,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match recommendations_repository
            .get_recommendations(&user_id.into_inner())
            .await
        {
            Ok(recommendations) => HttpResponse::Ok().json(recommendations),
            Err(RecommendationsRepositoryError::NotFound(_)) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Get recommendations failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}
