mod app;
mod theme;

pub use app::{Message, ViewerApp, run};
