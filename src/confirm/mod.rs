//! Modal yes/no prompts
//!
//! `Confirmer` owns the prompt queue. `confirm` returns a `PendingConfirm`
//! future so calling code can simply `.await` the user's decision.

pub mod confirmer;
pub mod resolver;

pub use confirmer::{
    ConfirmOptions, Confirmer, Prompt, DEFAULT_CANCEL_LABEL, DEFAULT_CONFIRM_LABEL,
};
pub use resolver::{PendingConfirm, Resolver};
