//! Raw data vector identifiers and snapshots.
//!
//! The host addresses its measurement vectors by small integer ids.  The
//! full id table is versioned with the host; [`VectorId`] is therefore a
//! transparent newtype over the raw id, with named constants for the
//! vectors every host version exposes.

use serde::Serialize;

/// Identifier of a host data vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VectorId(pub i32);

impl VectorId {
    /// Time axis of the waveform display.
    pub const TIME_AXIS: VectorId = VectorId(0);
    /// Acceleration waveform of input channel 1; channel n is `0 + n`.
    pub const WAVEFORM1: VectorId = VectorId(1);
    /// Frequency axis of the spectrum display.
    pub const FREQUENCY_AXIS: VectorId = VectorId(100);
    /// Spectrum of input channel 1; channel n is `100 + n`.
    pub const FREQUENCY1: VectorId = VectorId(101);
    /// Control trace in the frequency domain.
    pub const CONTROL: VectorId = VectorId(201);
    /// Demand trace in the frequency domain.
    pub const DEMAND: VectorId = VectorId(202);

    /// Waveform vector for a 0-based input channel.
    pub fn waveform(channel: u32) -> VectorId {
        VectorId(Self::WAVEFORM1.0 + channel as i32)
    }

    /// Spectrum vector for a 0-based input channel.
    pub fn spectrum(channel: u32) -> VectorId {
        VectorId(Self::FREQUENCY1.0 + channel as i32)
    }

    /// The raw host id.
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for VectorId {
    fn from(raw: i32) -> Self {
        VectorId(raw)
    }
}

/// Owned snapshot of one host data vector: samples plus display metadata.
#[derive(Debug, Clone, Serialize)]
pub struct VectorData {
    /// Display label, e.g. `"Frequency"`.
    pub label: String,
    /// Unit string, e.g. `"Hz"` or `"G"`.
    pub unit: String,
    /// Sample values, in host order.
    pub samples: Vec<f64>,
}

impl VectorData {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_vector_ids() {
        assert_eq!(VectorId::spectrum(0), VectorId::FREQUENCY1);
        assert_eq!(VectorId::spectrum(3), VectorId(104));
        assert_eq!(VectorId::waveform(0), VectorId::WAVEFORM1);
        assert_eq!(VectorId::waveform(7), VectorId(8));
    }

    #[test]
    fn test_vector_data_serialization() {
        let v = VectorData {
            label: "Frequency".into(),
            unit: "Hz".into(),
            samples: vec![10.0, 20.0, 40.0],
        };
        assert_eq!(v.len(), 3);
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"unit\":\"Hz\""));
        assert!(json.contains("[10.0,20.0,40.0]"));
    }
}
