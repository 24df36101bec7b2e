/// File-server hit counter
///
/// Counts every request that reaches the wrapped service. The counter lives in
/// `ApiMetrics`, shared through `web::Data`, never in a global.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Request counters shared across workers
#[derive(Debug, Default)]
pub struct ApiMetrics {
    fileserver_hits: AtomicU32,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) -> u32 {
        self.fileserver_hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn hits(&self) -> u32 {
        self.fileserver_hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.fileserver_hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware that records a hit in `ApiMetrics` per request
pub struct HitCounter {
    metrics: web::Data<ApiMetrics>,
}

impl HitCounter {
    pub fn new(metrics: web::Data<ApiMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterService {
            service: Rc::new(service),
            metrics: self.metrics.clone(),
        }))
    }
}

pub struct HitCounterService<S> {
    service: Rc<S>,
    metrics: web::Data<ApiMetrics>,
}

impl<S, B> Service<ServiceRequest> for HitCounterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let hits = self.metrics.record_hit();
        tracing::trace!(hits, path = %req.path(), "File server hit");

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, App, HttpResponse};

    #[test]
    fn counter_counts_and_resets() {
        let metrics = ApiMetrics::new();
        assert_eq!(metrics.record_hit(), 1);
        assert_eq!(metrics.record_hit(), 2);
        assert_eq!(metrics.hits(), 2);

        metrics.reset();
        assert_eq!(metrics.hits(), 0);
    }

    #[actix_web::test]
    async fn wrapped_routes_are_counted() {
        let metrics = web::Data::new(ApiMetrics::new());
        let app = actix_test::init_service(
            App::new()
                .service(
                    web::scope("/app")
                        .wrap(HitCounter::new(metrics.clone()))
                        .route("/", web::get().to(HttpResponse::Ok)),
                )
                .route("/other", web::get().to(HttpResponse::Ok)),
        )
        .await;

        for _ in 0..3 {
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/app/").to_request()).await;
        }
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/other").to_request()).await;

        assert_eq!(metrics.hits(), 3);
    }
}
