use std::convert::Infallible;
use std::sync::Arc;

use email_address::EmailAddress;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use warp::filters::method;
use warp::reply::{self, Response};
use warp::{filters, Filter, Rejection, Reply};

use crate::error::Error;
use crate::models::Id;
use crate::service::Accounts;
use crate::Result;

/// Largest form body accepted by any endpoint.
pub const MAX_FORM_BYTES : u64 = 16 * 1024;

pub type Server = Arc<Accounts>;

type BoxReply = Box<dyn Reply>;
type HandlerResult = std::result::Result<BoxReply, Infallible>;

fn with_server(
    server : &Server,
) -> impl Filter<Extract = (Server,), Error = Infallible> + Clone {
    let server = Arc::clone(server);
    warp::any().map(move || Arc::clone(&server))
}

fn form<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T : for<'de> Deserialize<'de> + Send,
{
    filters::body::content_length_limit(MAX_FORM_BYTES)
        .and(filters::body::form())
}

/// Rejects empty required fields.
pub fn require_fields(fields : &[&str]) -> Result<()> {
    if fields.iter().any(|f| f.is_empty()) {
        return Err(Error::BadRequest);
    }

    Ok(())
}

/// Boundary checks run before a registration reaches the service.
pub fn check_registration(
    username : &str,
    email : &str,
    password : &str,
) -> Result<()> {
    require_fields(&[username, email, password])?;

    if !EmailAddress::is_valid(email) {
        return Err(Error::InvalidEmail(email.to_string()));
    }

    Ok(())
}

#[derive(Serialize)]
struct UserIdReply {
    message : &'static str,
    user_id : Id,
}

#[derive(Serialize)]
struct LinkReply {
    message : &'static str,
    id :      Id,
}

fn respond<T : Serialize>(res : Result<T>) -> HandlerResult {
    match res {
        Ok(body) => Ok(Box::new(reply::json(&body))),
        Err(err) => Ok(Box::new(err)),
    }
}

macro_rules! handler {
    ($name:ident ( $($aname:ident : $atype:ty),*) $body:block) => {
        pub fn $name (
            $(
                $aname : $atype,
            )*
        ) -> impl Filter<Extract = (BoxReply,) , Error = Rejection> + Clone {
            $body
        }
    }
}

macro_rules! handler_or{
    ($head:expr $(, $tail:expr)*) => {
        $head
        $(
            .or($tail)
            .unify()
            .boxed()
        )*
    };
    ($head:expr $(, $tail:expr)*,) => {
        handler_or!($head $(, $tail)*)
    }
}

pub fn routes(
    server : &Server,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    handler_or!(
        get_root(),
        post_register(server),
        post_login(server),
        post_link(server),
        post_delete(server),
    )
    .recover(recover)
    .with(warp::log::custom(|info| {
        tracing::info!(
            status = info.status().as_u16(),
            method = %info.method(),
            path = info.path(),
            elapsed = ?info.elapsed(),
            "request"
        );
    }))
}

async fn recover(err : Rejection) -> std::result::Result<Error, Rejection> {
    use Error::*;

    let err = if err.is_not_found() {
        RouteNotFound
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        MethodNotAllowed
    } else {
        tracing::debug!(?err, "rejected request");
        BadRequest
    };

    Ok(err)
}

handler! { get_root () {
    #[derive(Serialize)]
    struct Res {
        text : &'static str,
    }

    warp::path::end()
        .and(method::get())
        .map(|| -> BoxReply {
            Box::new(reply::json(&Res { text : "account service" }))
        })
}}

handler! { post_register (server : &Server) {
    #[derive(Deserialize)]
    struct Req {
        username : String,
        email :    String,
        password : String,
    }

    warp::path!("register")
        .and(method::post())
        .and(with_server(server))
        .and(form())
        .and_then(|server : Server, body : Req| async move {
            let res = async {
                check_registration(
                    &body.username,
                    &body.email,
                    &body.password,
                )?;

                let user_id = server
                    .register(&body.username, &body.email, &body.password)
                    .await?;

                Ok::<_, Error>(UserIdReply {
                    message : "User registered successfully",
                    user_id,
                })
            };

            respond(res.await)
        })
}}

handler! { post_login (server : &Server) {
    #[derive(Deserialize)]
    struct Req {
        username : String,
        password : String,
    }

    warp::path!("login")
        .and(method::post())
        .and(with_server(server))
        .and(form())
        .and_then(|server : Server, body : Req| async move {
            let res = async {
                require_fields(&[&body.username[..], &body.password[..]])?;

                let user_id =
                    server.login(&body.username, &body.password).await?;

                Ok::<_, Error>(UserIdReply {
                    message : "Welcome aboard",
                    user_id,
                })
            };

            respond(res.await)
        })
}}

handler! { post_link (server : &Server) {
    #[derive(Deserialize)]
    struct Req {
        username : String,
        link_id :  String,
    }

    warp::path!("link")
        .and(method::post())
        .and(with_server(server))
        .and(form())
        .and_then(|server : Server, body : Req| async move {
            let res = async {
                require_fields(&[&body.username[..], &body.link_id[..]])?;

                let id = server.link(&body.username, &body.link_id).await?;

                Ok::<_, Error>(LinkReply {
                    message : "user link successful",
                    id,
                })
            };

            respond(res.await)
        })
}}

handler! { post_delete (server : &Server) {
    #[derive(Deserialize)]
    struct Req {
        username : String,
    }

    warp::path!("delete")
        .and(method::post())
        .and(with_server(server))
        .and(form())
        .and_then(|server : Server, body : Req| async move {
            let res = async {
                require_fields(&[body.username.as_str()])?;

                let user_id = server.delete(&body.username).await?;

                Ok::<_, Error>(UserIdReply {
                    message : "deleted",
                    user_id,
                })
            };

            respond(res.await)
        })
}}

impl Reply for Error {
    fn into_response(self) -> Response {
        use Error::*;

        let status = match &self {
            UsernameTaken(_) => StatusCode::BAD_REQUEST,
            UserNotFound(_) | RouteNotFound => StatusCode::NOT_FOUND,
            InvalidEmail(_) | BadRequest => StatusCode::UNPROCESSABLE_ENTITY,
            MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request refused");
        }

        #[derive(Serialize)]
        struct Detail {
            detail : &'static str,
        }

        reply::with_status(
            reply::json(&Detail {
                detail : self.detail(),
            }),
            status,
        )
        .into_response()
    }
}
