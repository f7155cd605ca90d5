pub mod access;
pub mod jwt;
pub mod phone;
pub mod schedule;

pub use access::*;
pub use jwt::*;
pub use phone::*;
pub use schedule::*;
