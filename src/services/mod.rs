pub mod article_service;
pub mod availability_service;
pub mod booking_service;
pub mod change_feed;
pub mod field_service;
pub mod profile_service;
pub mod report_service;
pub mod session_service;
pub mod settings_service;

pub use article_service::*;
pub use availability_service::*;
pub use booking_service::*;
pub use change_feed::*;
pub use field_service::*;
pub use profile_service::*;
pub use report_service::*;
pub use session_service::*;
pub use settings_service::*;
