//! Member infrastructure implementations

mod postgres_repository;
mod repository;

pub(crate) use postgres_repository::insert_member;
pub use postgres_repository::PostgresMemberRepository;
pub use repository::StorageMemberRepository;
