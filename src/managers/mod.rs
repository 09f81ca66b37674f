pub mod backup;
pub mod desktop;
pub mod logging;
pub mod notification;
pub mod upload;
