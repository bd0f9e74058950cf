//! In-memory map databases.
//!
//! Each store wraps a `tokio::sync::RwLock<HashMap<..>>`. Nothing is
//! persisted: restarting the process loses all data apart from the seed
//! fixtures in [`seed`].

mod community;
mod conversations;
mod login;
mod medications;
pub mod seed;
mod trails;
mod users;

pub use community::InMemoryCommunityRepository;
pub use conversations::InMemoryConversationStore;
pub use login::InMemoryLoginService;
pub use medications::InMemoryMedicationStore;
pub use trails::InMemoryTrailRepository;
pub use users::InMemoryUserRepository;
