pub mod browser;
pub mod driver;
pub mod pacing;
pub mod page;
