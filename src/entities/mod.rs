pub mod articles;
pub mod bookings;
pub mod fields;
pub mod profiles;
pub mod settings;

pub use articles as article_entity;
pub use bookings as booking_entity;
pub use bookings::BookingStatus;
pub use fields as field_entity;
pub use profiles as profile_entity;
pub use profiles::UserRole;
pub use settings as settings_entity;
