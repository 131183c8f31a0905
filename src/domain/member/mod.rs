//! Team member domain module

mod entity;
mod repository;
mod validation;

pub use entity::Member;
pub use repository::MemberRepository;
pub use validation::{validate_member_name, validate_role, MemberValidationError};
