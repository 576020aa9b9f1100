//! Extractor turning the session identity into a domain [`Actor`].

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, Error};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// The authenticated caller of a request.
///
/// Extraction fails with `401` when the session carries no identity or the
/// user is unknown, and with `403` when the user is banned.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
    pub fn into_inner(self) -> Actor {
        self.0
    }
}

impl FromRequest for CurrentActor {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let session = session.await?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let user_id = session.require_user_id()?;
            let actor = state.users.resolve_actor(&user_id).await?;
            Ok(CurrentActor(actor))
        })
    }
}
