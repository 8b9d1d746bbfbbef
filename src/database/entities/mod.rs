pub mod generated_image;

pub use generated_image::Entity as GeneratedImageEntity;
