pub mod article;
pub mod booking;
pub mod common;
pub mod field;
pub mod landing;
pub mod pagination;
pub mod profile;
pub mod report;
pub mod session;
pub mod settings;

pub use article::*;
pub use booking::*;
pub use common::*;
pub use field::*;
pub use landing::*;
pub use pagination::*;
pub use profile::*;
pub use report::*;
pub use session::*;
pub use settings::*;
