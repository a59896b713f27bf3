//! Tracing middleware attaching a request-scoped trace identifier.
//!
//! Each request runs inside a fresh [`TraceId`] scope and a `request` span.
//! The identifier is echoed in a `trace-id` response header, and one
//! completion event is logged per request with its status and latency.
//!
//! The middleware also scopes whether error responses may include internal
//! failure details; see [`error_details_exposed`].

use std::future::Future;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tokio::task_local;
use tracing::{Instrument, error, info, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

task_local! {
    static EXPOSE_ERROR_DETAILS: bool;
}

/// Whether server-fault responses in the current request may carry the
/// underlying failure message. Outside a request scope this is `false`.
#[must_use]
pub fn error_details_exposed() -> bool {
    EXPOSE_ERROR_DETAILS.try_with(|expose| *expose).unwrap_or(false)
}

/// Run `fut` with error detail exposure set to `expose`.
pub async fn scope_error_details<Fut>(expose: bool, fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    EXPOSE_ERROR_DETAILS.scope(expose, fut).await
}

/// Tracing middleware. Handlers read the identifier via
/// [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use tokku::Trace;
///
/// let app = App::new().wrap(Trace::new().exposing_error_details(true));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Trace {
    expose_error_details: bool,
}

impl Trace {
    /// Middleware that redacts server-fault details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow server-fault details in error bodies. Enable outside
    /// production only.
    #[must_use]
    pub const fn exposing_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware {
            service,
            expose_error_details: self.expose_error_details,
        }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
    expose_error_details: bool,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::generate();
        let method = req.method().to_string();
        let path = req.path().to_owned();
        let span = info_span!("request", %trace_id, %method, %path);
        let started = Instant::now();
        let expose = self.expose_error_details;

        let fut = self.service.call(req);
        let handled = async move {
            let outcome = fut.await;
            let elapsed_ms = started.elapsed().as_millis();
            let mut res = match outcome {
                Ok(res) => res,
                Err(err) => {
                    warn!(error = %err, elapsed_ms, "request failed before a response was built");
                    return Err(err);
                }
            };
            let status = res.status().as_u16();
            if res.status().is_server_error() {
                error!(status, elapsed_ms, "request completed");
            } else {
                info!(status, elapsed_ms, "request completed");
            }
            match HeaderValue::from_str(&trace_id.to_string()) {
                Ok(value) => {
                    res.response_mut()
                        .headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }
                Err(header_error) => {
                    error!(%header_error, "failed to encode trace identifier header");
                }
            }
            Ok(res)
        };

        Box::pin(TraceId::scope(
            trace_id,
            scope_error_details(expose, handled.instrument(span)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    async fn call_with<F, Fut, Res>(
        trace: Trace,
        handler: F,
    ) -> (actix_web::dev::ServiceResponse<actix_web::body::BoxBody>, String)
    where
        F: Fn() -> Fut + Clone + 'static,
        Fut: Future<Output = Res> + 'static,
        Res: actix_web::Responder + 'static,
    {
        let app =
            test::init_service(App::new().wrap(trace).route("/", web::get().to(handler))).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let res = test::call_service(&app, req).await;
        let trace_id = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned();
        (res, trace_id)
    }

    #[actix_web::test]
    async fn exposes_trace_id_in_handler() {
        let (res, trace_id) = call_with(Trace::new(), || async move {
            let id = TraceId::current().expect("trace id in scope");
            HttpResponse::Ok().body(id.to_string())
        })
        .await;
        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), trace_id);
    }

    #[rstest]
    #[case(Trace::new(), "false")]
    #[case(Trace::new().exposing_error_details(true), "true")]
    #[actix_web::test]
    async fn scopes_error_detail_exposure(#[case] trace: Trace, #[case] expected: &str) {
        let (res, _) = call_with(trace, || async move {
            HttpResponse::Ok().body(error_details_exposed().to_string())
        })
        .await;
        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), expected);
    }

    #[tokio::test]
    async fn exposure_defaults_to_redacted_outside_requests() {
        assert!(!error_details_exposed());
        assert!(scope_error_details(true, async { error_details_exposed() }).await);
    }

    #[actix_web::test]
    async fn propagates_trace_id_in_error_bodies() {
        use crate::domain::Error;
        use crate::inbound::http::ApiResult;

        let (res, trace_id) = call_with(Trace::new(), || async move {
            ApiResult::<HttpResponse>::Err(Error::not_found("missing"))
        })
        .await;
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.trace_id(), Some(trace_id.as_str()));
    }
}
