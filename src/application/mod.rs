//! Application layer managing state and user workflows.
//!
//! Owns the wizard controller, the signature pad and the smaller page
//! collaborators, and the interactive state the terminal host drives.

pub mod wizard;
pub mod signature_pad;
pub mod notice;
pub mod uploads;
pub mod markup;
pub mod state;

pub use wizard::*;
pub use signature_pad::*;
pub use notice::*;
pub use uploads::*;
pub use markup::*;
pub use state::*;
