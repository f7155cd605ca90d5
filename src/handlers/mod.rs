pub mod article;
pub mod booking;
pub mod dashboard;
pub mod field;
pub mod landing;
pub mod profile;
pub mod realtime;
pub mod session;
pub mod settings;

pub use article::article_config;
pub use booking::booking_config;
pub use dashboard::dashboard_config;
pub use field::field_config;
pub use landing::landing_config;
pub use profile::profile_config;
pub use realtime::realtime_config;
pub use session::session_config;
pub use settings::settings_config;
