//! Lost of Lock Indication (LLI) for phase tracking
use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Debug, Copy, Clone)]
    #[derive(PartialEq, PartialOrd)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct LliFlags: u8 {
        /// Current epoch is marked Ok or Unknown status
        const OK_OR_UNKNOWN = 0x00;
        /// Lock time decreased since previous epoch:
        /// cycle slip is possible
        const LOCK_LOSS = 0x01;
        /// Half cycle ambiguity not resolved yet
        const HALF_CYCLE_SLIP = 0x02;
    }
}

impl Default for LliFlags {
    fn default() -> Self {
        Self::OK_OR_UNKNOWN
    }
}
