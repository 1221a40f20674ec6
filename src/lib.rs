pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod month;
pub mod nav;
pub mod render;
pub mod resolve;
pub mod store;
pub mod widget;
