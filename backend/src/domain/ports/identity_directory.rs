//! Port for the external identity provider.

use async_trait::async_trait;

use crate::domain::MemberId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityDirectoryError {
        /// The provider could not be reached.
        Connection { message: String } => "identity provider connection failed: {message}",
        /// The provider refused the operation.
        Rejected { message: String } => "identity provider rejected the request: {message}",
    }
}

/// Port for removing sign-in identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Delete the identity record backing a member.
    async fn delete_identity(&self, id: &MemberId) -> Result<(), IdentityDirectoryError>;
}
