pub mod firebase_sync;
pub mod github;
pub mod init;
pub mod metadata;
