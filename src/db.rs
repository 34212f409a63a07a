pub mod live_query;
pub use live_query::{Document, DocumentStore, Filter, FilterOp, SharedStore, Subscription};
pub mod memory_store;
pub use memory_store::MemoryStore;
pub mod pg_store;
pub use pg_store::PgStore;
pub mod collection;
pub use collection::{Collection, CrudCollection, Entity};
pub mod user_repo;
pub use user_repo::UserRepository;
