pub mod status_screen;

pub use status_screen::{LoadingScreen, ScreenTone, StatusScreen};
