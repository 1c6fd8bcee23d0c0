mod app_state;
mod screen_state;
mod tabs;

pub use app_state::*;
pub use screen_state::*;
pub use tabs::*;
