pub mod init;
pub mod up;
pub mod validate;
