pub mod attachment;
pub mod classify;
pub mod config;
pub mod consts;
pub mod content;
pub mod controller;
pub mod download;
pub mod error;
pub mod external;
pub mod loader;
pub mod raster;
pub mod thumbnail;
pub mod transform;
