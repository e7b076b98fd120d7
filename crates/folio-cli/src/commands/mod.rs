pub mod config;
pub mod fetch;
pub mod fit;
pub mod info;
pub mod thumbs;
