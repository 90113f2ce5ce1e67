pub mod image;
pub mod profile;
pub mod rating;
pub mod session;
pub mod user;

pub use image::ImageRepository;
pub use profile::ProfileRepository;
pub use rating::RatingRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
