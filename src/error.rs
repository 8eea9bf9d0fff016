use quick_from::QuickFrom;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(QuickFrom, Debug)]
pub enum Error {
    UsernameTaken(String),
    UserNotFound(String),
    InvalidEmail(String),
    BadRequest,
    RouteNotFound,
    MethodNotAllowed,

    #[quick_from]
    Sqlite(rusqlite::Error),

    #[quick_from]
    Argon2(argon2::Error),

    #[quick_from]
    Join(tokio::task::JoinError),

    #[quick_from]
    Warp(warp::Error),
}

impl Error {
    /// Human readable reason sent back to the client.
    pub fn detail(&self) -> &'static str {
        use Error::*;

        match self {
            UsernameTaken(_) => "username already exists. try again.",
            UserNotFound(_) => "user not found",
            InvalidEmail(_) => "value is not a valid email address",
            BadRequest => "invalid request",
            RouteNotFound => "route not found",
            MethodNotAllowed => "method not allowed",
            _ => "internal server error",
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f : &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Error::*;

        match self {
            UsernameTaken(name) => write!(f, "username taken: {}", name),
            UserNotFound(name) => write!(f, "user not found: {}", name),
            InvalidEmail(email) => write!(f, "invalid email: {}", email),
            Sqlite(err) => write!(f, "sqlite: {}", err),
            Argon2(err) => write!(f, "argon2: {}", err),
            Join(err) => write!(f, "blocking task: {}", err),
            Warp(err) => write!(f, "server: {}", err),
            other => f.write_str(other.detail()),
        }
    }
}

impl std::error::Error for Error {}
