//! Infrastructure layer - External service implementations

pub mod invitation;
pub mod logging;
pub mod member;
pub mod sms;
pub mod storage;
pub mod team;
pub mod token;
