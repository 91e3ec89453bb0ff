//! Tower middleware layer for token authentication.
//!
//! The [`TesseraLayer`] resolves each request's user context through the
//! token service and stores it for the extractors.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use pin_project_lite::pin_project;
use tessera_auth_core::{ContextCodec, JsonContextCodec, RemoteSessionStore, TokenService};
use tessera_types::UserContext;
use tower::{Layer, Service};

use crate::client_ip::client_ip;
use crate::context::{AuthPolicy, UserContextExt, TOKEN_HEADER};
use crate::error::AuthRejection;

/// Configuration for the middleware layer.
#[derive(Debug, Clone)]
pub struct TesseraConfig {
    /// Header the token is read from (default: `token`).
    pub token_header: String,
    /// Policy applied to every request passing through the layer.
    pub policy: AuthPolicy,
}

impl Default for TesseraConfig {
    fn default() -> Self {
        Self {
            token_header: TOKEN_HEADER.to_string(),
            policy: AuthPolicy::Ignored,
        }
    }
}

impl TesseraConfig {
    /// Create a new config builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token header name.
    #[must_use]
    pub fn token_header(mut self, header: impl Into<String>) -> Self {
        self.token_header = header.into();
        self
    }

    /// Set the auth policy.
    #[must_use]
    pub fn policy(mut self, policy: AuthPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Tower layer that attaches a [`UserContext`] to every request.
pub struct TesseraLayer<R: RemoteSessionStore, C: ContextCodec = JsonContextCodec> {
    tokens: Arc<TokenService<R, C>>,
    config: TesseraConfig,
}

impl<R: RemoteSessionStore, C: ContextCodec> Clone for TesseraLayer<R, C> {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
            config: self.config.clone(),
        }
    }
}

impl<R: RemoteSessionStore, C: ContextCodec> TesseraLayer<R, C> {
    /// Create a layer with the default configuration.
    #[must_use]
    pub fn new(tokens: Arc<TokenService<R, C>>) -> Self {
        Self::with_config(tokens, TesseraConfig::default())
    }

    /// Create a layer with custom configuration.
    #[must_use]
    pub fn with_config(tokens: Arc<TokenService<R, C>>, config: TesseraConfig) -> Self {
        Self { tokens, config }
    }
}

impl<S, R: RemoteSessionStore, C: ContextCodec> Layer<S> for TesseraLayer<R, C> {
    type Service = TesseraService<S, R, C>;

    fn layer(&self, inner: S) -> Self::Service {
        TesseraService {
            inner,
            tokens: Arc::clone(&self.tokens),
            config: self.config.clone(),
        }
    }
}

/// The authentication service produced by [`TesseraLayer`].
pub struct TesseraService<S, R: RemoteSessionStore, C: ContextCodec = JsonContextCodec> {
    inner: S,
    tokens: Arc<TokenService<R, C>>,
    config: TesseraConfig,
}

impl<S: Clone, R: RemoteSessionStore, C: ContextCodec> Clone for TesseraService<S, R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            tokens: Arc::clone(&self.tokens),
            config: self.config.clone(),
        }
    }
}

impl<S, R, C> Service<Request<Body>> for TesseraService<S, R, C>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
    R: RemoteSessionStore + 'static,
    C: ContextCodec + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = TesseraFuture<S>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let token = req
            .headers()
            .get(self.config.token_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        let host = client_ip(req.headers(), peer);

        let tokens = Arc::clone(&self.tokens);
        let resolve = Box::pin(async move {
            tokens
                .resolve_request_context(token.as_deref(), host)
                .await
        });

        // Use the instance that was driven to readiness.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        TesseraFuture {
            state: FutureState::Resolving {
                resolve,
                pending: Some((inner, req)),
                policy: self.config.policy,
            },
        }
    }
}

type ResolveFuture = Pin<Box<dyn Future<Output = UserContext> + Send>>;

pin_project! {
    /// Future for [`TesseraService`].
    pub struct TesseraFuture<S>
    where
        S: Service<Request<Body>, Response = Response<Body>>,
    {
        #[pin]
        state: FutureState<S>,
    }
}

pin_project! {
    #[project = FutureStateProj]
    enum FutureState<S>
    where
        S: Service<Request<Body>, Response = Response<Body>>,
    {
        Resolving {
            resolve: ResolveFuture,
            pending: Option<(S, Request<Body>)>,
            policy: AuthPolicy,
        },
        Calling {
            #[pin]
            future: S::Future,
        },
        Done,
    }
}

impl<S> Future for TesseraFuture<S>
where
    S: Service<Request<Body>, Response = Response<Body>>,
{
    type Output = Result<S::Response, S::Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let this = self.as_mut().project();

            match this.state.project() {
                FutureStateProj::Resolving {
                    resolve,
                    pending,
                    policy,
                } => {
                    let context = ready!(resolve.as_mut().poll(cx));
                    let Some((mut service, mut request)) = pending.take() else {
                        panic!("polled after completion");
                    };

                    if *policy == AuthPolicy::Required && !context.is_authenticated() {
                        let rejection = AuthRejection::for_context(&context);
                        tracing::debug!(
                            code = rejection.error_code(),
                            path = %request.uri().path(),
                            "rejecting unauthenticated request"
                        );
                        self.set(TesseraFuture {
                            state: FutureState::Done,
                        });
                        return Poll::Ready(Ok(rejection.into_response()));
                    }

                    request.extensions_mut().insert(UserContextExt(context));
                    let future = service.call(request);

                    self.set(TesseraFuture {
                        state: FutureState::Calling { future },
                    });
                }
                FutureStateProj::Calling { future } => {
                    return future.poll(cx);
                }
                FutureStateProj::Done => {
                    panic!("polled after completion");
                }
            }
        }
    }
}
