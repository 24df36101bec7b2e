/// Admin Routes
///
/// Hit counter page and the development-only reset.

use actix_web::{web, HttpResponse};

use crate::configuration::Settings;
use crate::error::{AppError, ErrorContext};
use crate::middleware::ApiMetrics;
use crate::store::Store;

fn metrics_page(hits: u32) -> String {
    format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        hits
    )
}

/// GET /admin/metrics
pub async fn metrics(metrics: web::Data<ApiMetrics>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(metrics_page(metrics.hits()))
}

/// POST /admin/reset
///
/// Deletes every user (and with them every chirp and refresh token) and zeroes
/// the hit counter. Refused with 403 outside the `dev` platform.
pub async fn reset(
    settings: web::Data<Settings>,
    metrics: web::Data<ApiMetrics>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("admin_reset");

    if !settings.application.is_dev() {
        return Err(context.record(AppError::Forbidden(
            "Reset is only allowed in dev environment".into(),
        )));
    }

    store
        .delete_all_users()
        .await
        .map_err(|e| context.record(e.into()))?;
    metrics.reset();

    tracing::warn!(request_id = %context.request_id, "All users deleted and hit counter reset");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!(
            "Hits have been set to {}\nAll users deleted",
            metrics.hits()
        )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_page_shows_the_count() {
        let page = metrics_page(42);
        assert!(page.contains("<h1>Welcome, Chirpy Admin</h1>"));
        assert!(page.contains("Chirpy has been visited 42 times!"));
    }
}
