//! Port for the object store holding member avatars.

use async_trait::async_trait;

use crate::domain::MemberId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStorageError {
        /// The object store could not be reached.
        Connection { message: String } => "avatar storage connection failed: {message}",
        /// Listing or removing objects failed.
        Operation { message: String } => "avatar storage operation failed: {message}",
    }
}

/// Port for removing a member's stored avatar images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStorage: Send + Sync {
    /// Remove every stored avatar object of the member and return how many
    /// objects were deleted. Members without avatars yield `Ok(0)`.
    async fn remove_avatars(&self, id: &MemberId) -> Result<usize, AvatarStorageError>;
}
