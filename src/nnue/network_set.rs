//! The three phase networks and the process-wide network slot.

use std::fmt;
use std::path::Path;

use log::error;
use once_cell::sync::OnceCell;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::accumulator::Accumulator;
use super::network::Network;
use crate::error::LoadError;

/// Evaluation regime selecting which network is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    #[default]
    Middlegame,
    Endgame,
    Sacrifice,
}

impl Phase {
    /// All phases in index order
    pub const ALL: [Phase; 3] = [Phase::Middlegame, Phase::Endgame, Phase::Sacrifice];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Phase::Middlegame => 0,
            Phase::Endgame => 1,
            Phase::Sacrifice => 2,
        }
    }

    /// Inverse of [`Phase::index`]; out-of-range values have no phase.
    #[inline]
    #[must_use]
    pub const fn from_index(idx: usize) -> Option<Phase> {
        match idx {
            0 => Some(Phase::Middlegame),
            1 => Some(Phase::Endgame),
            2 => Some(Phase::Sacrifice),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Middlegame => write!(f, "middlegame"),
            Phase::Endgame => write!(f, "endgame"),
            Phase::Sacrifice => write!(f, "sacrifice"),
        }
    }
}

/// One network per [`Phase`], indexed by the phase.
#[derive(Clone)]
pub struct NetworkSet {
    networks: [Network; 3],
}

impl NetworkSet {
    #[must_use]
    pub fn new(middlegame: Network, endgame: Network, sacrifice: Network) -> Self {
        NetworkSet {
            networks: [middlegame, endgame, sacrifice],
        }
    }

    /// Three all-zero networks
    #[must_use]
    pub fn zeroed() -> Self {
        Self::new(Network::zeroed(), Network::zeroed(), Network::zeroed())
    }

    /// Load all three networks, failing on the first error.
    ///
    /// Paths are given in [`Phase::ALL`] order.
    pub fn from_files<P: AsRef<Path>>(paths: [P; 3]) -> Result<Self, LoadError> {
        let [middlegame, endgame, sacrifice] = paths;
        Ok(Self::new(
            Network::load(middlegame)?,
            Network::load(endgame)?,
            Network::load(sacrifice)?,
        ))
    }

    /// Load all three networks from in-memory blobs in [`Phase::ALL`] order.
    pub fn from_bytes(blobs: [&[u8]; 3]) -> Result<Self, LoadError> {
        let [middlegame, endgame, sacrifice] = blobs;
        Ok(Self::new(
            Network::from_bytes(middlegame)?,
            Network::from_bytes(endgame)?,
            Network::from_bytes(sacrifice)?,
        ))
    }

    /// Try to load every network, replacing the ones that load.
    ///
    /// Each failure is logged and resets that phase's network to zero. Returns
    /// `true` only if all three loaded; a host must not start searching
    /// otherwise.
    pub fn load_files<P: AsRef<Path>>(&mut self, paths: [P; 3]) -> bool {
        let mut success = true;
        for (phase, path) in Phase::ALL.into_iter().zip(paths) {
            self.networks[phase.index()] = match Network::load(path) {
                Ok(network) => network,
                Err(err) => {
                    error!("failed to load {phase} network: {err}");
                    success = false;
                    Network::zeroed()
                }
            };
        }
        success
    }

    #[inline]
    #[must_use]
    pub fn get(&self, phase: Phase) -> &Network {
        &self.networks[phase.index()]
    }

    /// Evaluate `acc` with `phase`'s network
    #[inline]
    #[must_use]
    pub fn evaluate(&self, acc: &Accumulator, phase: Phase, white_to_move: bool) -> i32 {
        self.get(phase).evaluate(acc, white_to_move)
    }
}

static GLOBAL_NETWORKS: OnceCell<NetworkSet> = OnceCell::new();

/// Install the process-wide network set.
///
/// Only the first call succeeds; later calls hand their set back.
pub fn install_global(networks: NetworkSet) -> Result<&'static NetworkSet, NetworkSet> {
    GLOBAL_NETWORKS
        .try_insert(networks)
        .map_err(|(_, rejected)| rejected)
}

/// The process-wide network set, if one was installed.
#[must_use]
pub fn global() -> Option<&'static NetworkSet> {
    GLOBAL_NETWORKS.get()
}

/// The process-wide network set, loading it on first use.
///
/// Concurrent first callers block until exactly one of them has run `load`.
/// A failed load leaves the slot empty so that a later call may retry.
pub fn global_or_try_init<F>(load: F) -> Result<&'static NetworkSet, LoadError>
where
    F: FnOnce() -> Result<NetworkSet, LoadError>,
{
    GLOBAL_NETWORKS.get_or_try_init(load)
}
