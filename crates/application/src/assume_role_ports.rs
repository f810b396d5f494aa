mod clock;
mod identity;
mod repository;

pub use clock::{Clock, SystemClock};
pub use identity::{AssumeRoleRequest, IdentityProvider, IssuedCredentials};
pub use repository::RoleRecordRepository;
