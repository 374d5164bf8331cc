//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod avatar_storage;
mod identity_directory;
mod member_directory;
mod member_repository;
mod viewport_signal;

#[cfg(test)]
pub use avatar_storage::MockAvatarStorage;
pub use avatar_storage::{AvatarStorage, AvatarStorageError};
#[cfg(test)]
pub use identity_directory::MockIdentityDirectory;
pub use identity_directory::{IdentityDirectory, IdentityDirectoryError};
#[cfg(test)]
pub use member_directory::MockMemberDirectory;
pub use member_directory::{MemberDirectory, MemberDirectoryError};
#[cfg(test)]
pub use member_repository::MockMemberRepository;
pub use member_repository::{MemberRepository, MemberRepositoryError};
#[cfg(test)]
pub use viewport_signal::MockViewportSignal;
pub use viewport_signal::ViewportSignal;
