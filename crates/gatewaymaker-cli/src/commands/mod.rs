pub mod generate;
pub mod init;
pub mod pools;
pub mod validate;
