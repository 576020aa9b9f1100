//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpResponse, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAdminConsole, MockPlatformMessages, MockSkillCommand, MockSkillModeration,
    MockSkillQuery, MockSwapCommand, MockSwapQuery, MockUserDirectory,
};
use crate::domain::{Actor, Error, UserId, UserRole};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::configure_extractors;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Request that stands in for the external auth service and signs `user`
/// into the session.
pub fn login_request(user: &UserId) -> TestRequest {
    TestRequest::post().uri(&format!("/test/login/{user}"))
}

/// Sign `user` in and return the session cookie.
pub async fn login<S, B>(app: &S, user: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let response = test::call_service(app, login_request(user).to_request()).await;
    session_cookie(&response).expect("session cookie issued")
}

/// Send `request` and decode the JSON body; empty bodies decode to `null`.
pub async fn send<S, B>(app: &S, request: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, request).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

async fn login_as(session: SessionContext, path: web::Path<UserId>) -> Result<HttpResponse, Error> {
    session.persist_user(&path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mock driving ports, one per field of [`HttpState`].
#[derive(Default)]
pub struct TestPorts {
    pub users: MockUserDirectory,
    pub skills: MockSkillCommand,
    pub skills_query: MockSkillQuery,
    pub moderation: MockSkillModeration,
    pub swaps: MockSwapCommand,
    pub swaps_query: MockSwapQuery,
    pub admin: MockAdminConsole,
    pub messages: MockPlatformMessages,
}

impl TestPorts {
    /// Ports whose directory resolves every session to `actor`.
    pub fn acting_as(actor: Actor) -> Self {
        let mut ports = Self::default();
        ports
            .users
            .expect_resolve_actor()
            .returning(move |_| Ok(actor));
        ports
    }

    pub fn into_state(self) -> HttpState {
        HttpState {
            users: Arc::new(self.users),
            skills: Arc::new(self.skills),
            skills_query: Arc::new(self.skills_query),
            moderation: Arc::new(self.moderation),
            swaps: Arc::new(self.swaps),
            swaps_query: Arc::new(self.swaps_query),
            admin: Arc::new(self.admin),
            messages: Arc::new(self.messages),
        }
    }
}

pub fn member() -> Actor {
    Actor::new(UserId::random(), UserRole::User)
}

pub fn admin() -> Actor {
    Actor::new(UserId::random(), UserRole::Admin)
}

/// App with session support, the test login route, and `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure_extractors)
        .wrap(test_session_middleware())
        .route("/test/login/{id}", web::post().to(login_as))
}

/// App exposing the full `/api/v1` surface over `state`.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    test_app(state).service(web::scope("/api/v1").configure(super::configure))
}
