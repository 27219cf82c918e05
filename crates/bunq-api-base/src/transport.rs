use std::sync::Arc;

use crate::{Error, HttpRequest, HttpResponse};

/// Sends a request and returns whatever the server answered.
///
/// Implementations must not interpret the response status: a `4xx` is a successful delivery and
/// is returned as `Ok`. Only failures to deliver the request at all are errors.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send the request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        (**self).send(request).await
    }
}
