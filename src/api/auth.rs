use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::api::{
        admin::{AdminAccount, AdminCredentials},
        auth::{AuthToken, VoterLogin, AUTH_TOKEN_COOKIE},
    },
};

pub fn routes() -> Vec<Route> {
    routes![authenticate, voter_login, logout]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admin: &State<AdminAccount>,
    config: &State<Config>,
) -> Result<()> {
    if !admin.verify(&credentials)? {
        return Err(Error::Status(
            Status::Unauthorized,
            "No admin found with the provided username and password combination.".to_string(),
        ));
    }

    let token = AuthToken::new(admin.identity().clone());
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[post("/auth/voter", data = "<login>", format = "json")]
pub async fn voter_login(
    cookies: &CookieJar<'_>,
    login: Json<VoterLogin>,
    admin: &State<AdminAccount>,
    config: &State<Config>,
) -> Result<()> {
    let identity = login.0.identity;
    if identity.is_empty() {
        return Err(Error::Status(
            Status::BadRequest,
            "Identity must not be empty".to_string(),
        ));
    }
    // Otherwise anyone could act as the administrator without a password.
    if &identity == admin.identity() {
        return Err(Error::Status(
            Status::Unauthorized,
            format!("{identity} must sign in with a password"),
        ));
    }

    let token = AuthToken::new(identity);
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
