use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;

pub type DbPool = diesel_async::pooled_connection::bb8::Pool<AsyncPgConnection>;
pub type DbConnectionManager = AsyncDieselConnectionManager<AsyncPgConnection>;

/// Shared state cloned into every handler. The pool is the only shared
/// mutable resource in the process.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
}
