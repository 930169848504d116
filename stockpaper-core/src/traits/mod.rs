//! Collaborator traits
//!
//! These traits define the interface between the run controller and the
//! board-specific implementations of the network link, the remote data
//! source, the display and the power subsystems.

pub mod link;
pub mod power;
pub mod renderer;
pub mod source;

pub use link::{Credential, CredentialError, CredentialList, LinkProvider, LinkState};
pub use power::{PowerManager, PowerState};
pub use renderer::{Emphasis, RenderError, Renderer};
pub use source::{DataSource, FetchError, Quote, TimeText, TIME_PLACEHOLDER};
