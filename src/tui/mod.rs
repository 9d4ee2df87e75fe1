pub mod app;
pub mod input;
pub mod render;
pub mod theme;
pub mod toast;

pub use app::run;
