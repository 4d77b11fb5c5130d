pub mod server;

pub use server::TestServer;

/// Header carrying the acting user identity; absent means guest mode.
pub const USER_ID_HEADER: &str = "X-User-Id";
