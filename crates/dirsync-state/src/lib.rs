//! State repositories.
//!
//! The engine treats state as one opaque JSON document with get/put
//! semantics. Production runs store it in S3; local runs and tests use a
//! file on disk.

pub mod disk;
pub mod s3;

pub use disk::DiskStateRepository;
pub use s3::S3StateRepository;
