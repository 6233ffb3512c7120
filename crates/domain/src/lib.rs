pub mod assignment;
pub mod case;
pub mod error;
pub mod events;
pub mod identity;
pub mod modification;
pub mod noc;
pub mod ports;
pub mod roles;
pub mod search;

pub type DomainResult<T> = Result<T, error::DomainError>;
