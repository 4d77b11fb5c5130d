use axum::extract::FromRef;

use crate::book_store::BookService;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedBookService = Arc<BookService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub book_service: GuardedBookService,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedBookService {
    fn from_ref(input: &ServerState) -> Self {
        input.book_service.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
