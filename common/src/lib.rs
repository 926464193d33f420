#![deny(clippy::all)]
#![deny(clippy::dbg_macro)]

pub use identity::{Identity, ResolvedAddress};
pub use network::{LooseSource, LpPriceSource, NetworkConfig};
pub use settings::{GroupRequirement, Settings, SettingsError};
pub use user::User;

pub mod decimal;
mod identity;
mod network;
mod settings;
mod user;
