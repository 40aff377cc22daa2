//! Navigation blocks forwarding
use std::collections::HashMap;

use gnss::prelude::{Constellation, SV};
use hifitime::Epoch;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    block::{BlockID, RawBlock},
    constellation::sv_from_svid,
    decoder::{DecodeEvent, Session},
    Error,
};

/// [NavigationMessage] is a navigation block, forwarded as is to
/// the ephemeris decoders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavigationMessage {
    /// SBF block number
    pub block_number: u16,
    /// Block revision
    pub revision: u8,
    /// Transmission [Epoch]
    pub epoch: Epoch,
    /// Satellite this message describes, when applicable
    pub sv: Option<SV>,
    /// Block payload, following the time tag
    pub payload: Vec<u8>,
}

impl NavigationMessage {
    /// [BlockID] of this message
    pub fn block_id(&self) -> BlockID {
        BlockID::from(self.block_number)
    }
}

/// Remembers the latest decoded navigation payloads,
/// so unchanged ones are not forwarded twice.
#[derive(Debug, Default, Clone)]
pub(crate) struct NavigationFilter {
    latest: HashMap<(u16, u8), Vec<u8>>,
}

impl NavigationFilter {
    /// Returns true if this payload differs from the latest one
    /// of the same block number and satellite.
    fn update(&mut self, number: u16, svid: u8, payload: &[u8]) -> bool {
        match self.latest.get(&(number, svid)) {
            Some(latest) if latest.as_slice() == payload => false,
            _ => {
                self.latest.insert((number, svid), payload.to_vec());
                true
            },
        }
    }

    pub fn clear(&mut self) {
        self.latest.clear();
    }
}

/// Forwards a navigation block
pub(crate) fn navigation(session: &mut Session, block: &RawBlock) -> Result<DecodeEvent, Error> {
    let epoch = block.epoch()?;
    let number = u16::from(block.id);

    let svid = if block.id.has_svid() {
        block.payload.first().copied()
    } else {
        None
    };

    let sv = svid.and_then(sv_from_svid);

    if block.id == BlockID::GLONav {
        if let (Some(sv), Some(k)) = (sv, block.payload.get(1)) {
            if sv.constellation == Constellation::Glonass {
                session.glonass.insert(sv, *k as i8);
            }
        }
    }

    if block.id.is_decoded_navigation() && !session.options.all_ephemerides() {
        let svid = svid.unwrap_or(0);
        if !session.navigation.update(number, svid, &block.payload) {
            debug!("{} - {:?} unchanged", epoch, block.id);
            return Ok(DecodeEvent::NoOp);
        }
    }

    Ok(DecodeEvent::NavigationMessage(NavigationMessage {
        block_number: number,
        revision: block.revision,
        epoch,
        sv,
        payload: block.payload.clone(),
    }))
}
