//! # ado-auth
//!
//! Credential resolution for Azure DevOps REST calls.
//!
//! Three interchangeable backends behind one [`Authenticator`] contract:
//! a personal access token from the environment (`Basic` header), the
//! ambient credential chain (Azure CLI, Azure Developer CLI, service
//! principal, managed identity), and interactive browser sign-in with silent
//! reuse. [`create_authenticator`] picks one from a selector string.
//!
//! Separately, [`TenantResolver`] maps an organization name to the Entra
//! tenant that owns it, via a cached side-channel probe, so multi-tenant
//! users can point the bearer backends at the right directory.

pub mod ambient;
pub mod authenticator;
pub mod error;
pub mod factory;
pub mod interactive;
pub mod oauth;
pub mod pat;
pub mod tenant;

pub use authenticator::{AuthKind, AuthScheme, Authenticator};
pub use error::AuthError;
pub use factory::{AuthMode, AuthOptions, create_authenticator, create_authenticator_with};
pub use tenant::{TenantCache, TenantResolver};
