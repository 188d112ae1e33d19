mod store;

pub use store::{CachedSessionStore, InMemorySessionStore, SessionId, SessionMemory, SessionStore};
