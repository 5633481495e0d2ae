//! Process-local adapters for the user, post and session ports.
//!
//! Each store guards its table with a single lock and performs every port
//! operation inside one critical section, which gives the per-record
//! atomicity the domain relies on.

mod posts;
mod sessions;
mod users;

pub use posts::InMemoryPostRepository;
pub use sessions::InMemorySessionStore;
pub use users::InMemoryUserRepository;
