pub mod banner;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod downstream;
pub mod lesson;
pub mod markdown;
pub mod normalize;
pub mod quiz;
pub mod request;
pub mod server;
pub mod stubs;
