use gnss::prelude::Constellation;

use crate::signal::SignalInfo;

/// Maximal number of signals a [SignalTable] may describe
pub const MAX_SIGNALS: usize = 16;

/// [SignalTable] maps the local signal indexes of a Meas3 block
/// to SBF signal numbers, for one constellation.
/// The default table of the constellation is reduced by
/// an exclusion mask, the remaining signals are compacted.
/// ```
/// use sbf_rnx::prelude::*;
///
/// let table = SignalTable::new(Constellation::GPS, 0b10);
/// assert_eq!(table.len(), 5);
/// assert_eq!(table.signal_number(0), Some(0));
/// assert_eq!(table.signal_number(1), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SignalTable {
    constellation: Constellation,
    signals: Vec<u8>,
}

impl SignalTable {
    /// Default signal numbers, per constellation
    fn defaults(constellation: Constellation) -> &'static [u8] {
        match constellation {
            Constellation::GPS => &[0, 1, 2, 3, 4, 5],
            Constellation::Glonass => &[8, 9, 10, 11, 12],
            Constellation::Galileo => &[17, 19, 20, 21, 22],
            Constellation::BeiDou => &[28, 29, 30, 13, 14, 34],
            Constellation::SBAS => &[24, 25],
            Constellation::QZSS => &[6, 7, 26, 27, 32, 33],
            Constellation::IRNSS => &[15],
            _ => &[],
        }
    }

    /// Builds the [SignalTable] of this [Constellation], where
    /// bit j of `excluded` removes the j-th default signal.
    pub fn new(constellation: Constellation, excluded: u16) -> Self {
        let signals = Self::defaults(constellation)
            .iter()
            .enumerate()
            .filter_map(|(j, number)| {
                if excluded & (1 << j) == 0 {
                    Some(*number)
                } else {
                    None
                }
            })
            .take(MAX_SIGNALS)
            .collect();
        Self {
            constellation,
            signals,
        }
    }

    pub fn constellation(&self) -> Constellation {
        self.constellation
    }

    /// Number of signals
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// SBF signal number of this local index
    pub fn signal_number(&self, index: usize) -> Option<u8> {
        self.signals.get(index).copied()
    }

    /// [SignalInfo] of this local index
    pub fn signal(&self, index: usize) -> Option<SignalInfo> {
        SignalInfo::from_number(self.signal_number(index)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn default_tables() {
        let table = SignalTable::new(Constellation::BeiDou, 0);
        assert_eq!(table.len(), 6);
        assert_eq!(table.signal_number(3), Some(13));
        assert_eq!(table.signal_number(6), None);
        for index in 0..table.len() {
            let info = table.signal(index).unwrap();
            assert_eq!(info.constellation, Constellation::BeiDou);
        }
        assert!(SignalTable::new(Constellation::Mixed, 0).is_empty());
    }
    #[test]
    fn exclusion_compaction() {
        let full = SignalTable::new(Constellation::Galileo, 0);
        let reduced = SignalTable::new(Constellation::Galileo, 0b00101);
        assert_eq!(reduced.len(), 3);
        // surviving signals keep their order
        assert_eq!(reduced.signal_number(0), full.signal_number(1));
        assert_eq!(reduced.signal_number(1), full.signal_number(3));
        assert_eq!(reduced.signal_number(2), full.signal_number(4));

        // excluding everything
        let empty = SignalTable::new(Constellation::IRNSS, 0x01);
        assert!(empty.is_empty());
        assert_eq!(empty.signal_number(0), None);
    }
}
