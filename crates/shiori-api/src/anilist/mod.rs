pub mod catalog;
pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use catalog::{QueryDocument, Variables};
pub use client::AniListClient;
pub use error::AniListError;
