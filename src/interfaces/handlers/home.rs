use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Portfolio Experience API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "experiences": "/api/v1/experiences",
            "paginate": "/api/v1/experiences/paginate",
            "health": "/api/v1/admin/health"
        }
    }))
}
