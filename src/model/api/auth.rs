use chrono::{serde::ts_seconds, DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::common::Principal;

/// The authenticated principal behind a request.
///
/// Identity is established by the submission layer, which signs a bearer
/// token naming the principal with the shared `jwt_secret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Principal);

/// Token claims: the principal plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    sub: Principal,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

impl Caller {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    /// Sign a token for `principal` that is valid for `ttl`.
    pub fn issue(principal: impl Into<Principal>, ttl: Duration, config: &Config) -> String {
        let claims = Claims {
            sub: principal.into(),
            expire_at: Utc::now() + ttl,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings")
    }

    /// Verify a token and extract the caller it names.
    pub fn from_token(token: &str, config: &Config) -> Result<Self> {
        let principal = jsonwebtoken::decode(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.sub)?;
        if principal.is_null() {
            return Err(Error::unauthorized("Tokens cannot name the null principal"));
        }
        Ok(Self(principal))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caller {
    type Error = Error;

    /// Get the caller from an `Authorization: Bearer <token>` header.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            return Outcome::Failure((
                Status::InternalServerError,
                Error::internal("Caller tokens cannot be verified without a config"),
            ));
        };

        let Some(header) = req.headers().get_one("Authorization") else {
            return Outcome::Failure((
                Status::Unauthorized,
                Error::unauthorized("Missing bearer token"),
            ));
        };
        let Some(token) = header.strip_prefix("Bearer ") else {
            return Outcome::Failure((
                Status::Unauthorized,
                Error::unauthorized("Authorization must be a bearer token"),
            ));
        };

        match Self::from_token(token.trim(), config) {
            Ok(caller) => Outcome::Success(caller),
            Err(e) => Outcome::Failure((Status::Unauthorized, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::{figment::Figment, local::asynchronous::Client};

    use crate::error::ErrorKind;

    fn config(secret: &str) -> Config {
        Figment::new()
            .merge(("owner", "owner"))
            .merge(("jwt_secret", secret))
            .extract()
            .unwrap()
    }

    #[test]
    fn token_round_trip() {
        let config = config("secret");
        let token = Caller::issue("alice", Duration::minutes(5), &config);
        let caller = Caller::from_token(&token, &config).unwrap();
        assert_eq!(caller.principal().as_str(), "alice");
    }

    #[test]
    fn bad_tokens_rejected() {
        let config = config("secret");

        let forged = Caller::issue("alice", Duration::minutes(5), &self::config("other"));
        assert!(matches!(
            Caller::from_token(&forged, &config),
            Err(Error::Jwt(_))
        ));

        let expired = Caller::issue("alice", Duration::minutes(-5), &config);
        assert!(Caller::from_token(&expired, &config).is_err());

        let null = Caller::issue("0x0000", Duration::minutes(5), &config);
        assert!(matches!(
            Caller::from_token(&null, &config),
            Err(Error::Unauthorized(_))
        ));
    }

    #[rocket::async_test]
    async fn missing_config_is_internal() {
        let client = Client::untracked(rocket::build()).await.unwrap();
        let request = client
            .get("/")
            .header(rocket::http::Header::new("Authorization", "Bearer token"));
        match Caller::from_request(request.inner()).await {
            Outcome::Failure((status, e)) => {
                assert_eq!(status, Status::InternalServerError);
                assert_eq!(e.kind(), ErrorKind::Internal);
                assert_eq!(e.status(), status);
            }
            _ => panic!("expected the guard to fail"),
        }
    }
}
