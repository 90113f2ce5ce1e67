pub mod image;
pub mod profile;
pub mod rating;
pub mod session;
pub mod user;

pub use image::Image;
pub use profile::Profile;
pub use rating::Rating;
pub use session::{Session, SessionStatus};
pub use user::{User, UserRole};
