//! Shared harness for HTTP integration tests.
//!
//! The application is assembled exactly as the server does it, over the
//! in-memory adapters. A `/test/login/{id}` route stands in for the external
//! authentication service and signs a user into the session cookie.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite, time::Duration};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode};
use actix_web::test::{self, TestRequest};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::Value;

use skillswap::domain::{
    CredentialHash, DisplayName, EmailAddress, Error, SkillModerationPolicy, User, UserId,
    UserRole,
};
use skillswap::inbound::http::health::HealthState;
use skillswap::inbound::http::session::SessionContext;
use skillswap::outbound::notify::LoggingSwapNotifier;
use skillswap::server::{
    AppDependencies, Repositories, SESSION_COOKIE_NAME, SessionCookie, build_app,
    build_http_state,
};

/// Repositories plus the cookie settings used to build each app.
pub struct Harness {
    pub repos: Repositories,
    policy: SkillModerationPolicy,
    session: SessionCookie,
}

impl Harness {
    pub fn new(policy: SkillModerationPolicy) -> Self {
        Self {
            repos: Repositories::in_memory(),
            policy,
            session: SessionCookie {
                key: Key::generate(),
                secure: false,
                same_site: SameSite::Lax,
                ttl: Duration::hours(2),
            },
        }
    }

    /// Store a member (or admin) directly, as registration would.
    pub async fn seed_user(&self, name: &str, role: UserRole) -> UserId {
        let mut user = User::register(
            UserId::random(),
            DisplayName::new(name).expect("valid name"),
            EmailAddress::new(format!(
                "{}@example.com",
                name.to_lowercase().replace(' ', ".")
            ))
            .expect("valid email"),
            CredentialHash::new("not-a-real-hash"),
            Utc::now(),
        );
        user.role = role;
        self.repos.users.insert(&user).await.expect("seed user");
        user.id
    }

    /// Initialise the application service.
    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        let http_state = build_http_state(
            &self.repos,
            Arc::new(LoggingSwapNotifier),
            Arc::new(mockable::DefaultClock),
            self.policy,
        );
        let app = build_app(AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(http_state),
            session: self.session.clone(),
        })
        .service(
            web::scope("/test")
                .wrap(self.session.middleware())
                .route("/login/{id}", web::post().to(login_as)),
        );
        test::init_service(app).await
    }
}

async fn login_as(session: SessionContext, path: web::Path<UserId>) -> Result<HttpResponse, Error> {
    session.persist_user(&path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign `user` in and return the session cookie.
pub async fn login<S, B>(app: &S, user: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let request = TestRequest::post()
        .uri(&format!("/test/login/{user}"))
        .to_request();
    let response = test::call_service(app, request).await;
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("session cookie issued")
}

/// Send a JSON request as the holder of `cookie` and decode the reply.
///
/// Empty bodies decode to `null`.
pub async fn call<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut request = TestRequest::default()
        .method(method)
        .uri(uri)
        .cookie(cookie.clone());
    if let Some(body) = body {
        request = request.set_json(body);
    }
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

/// The `id` field of a JSON object, as a string.
pub fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id field").to_owned()
}
