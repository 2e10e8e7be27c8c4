//! The installed component: its on-disk layout, derived state, and the
//! variant swap.

pub mod layout;
pub mod state;
pub mod swap;

pub use layout::InstallLayout;
pub use state::{InstallationState, LiveInspector, LocalVersion, StateInspector, Variant};
pub use swap::{SwapOutcome, VariantSwapper};
