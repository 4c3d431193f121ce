pub mod analyze;
pub mod ask;
pub mod auth;
pub mod info;
pub mod init;
pub mod sections;
