use std::{ops::Range, slice};

use hhsim_core::Snapshot;
use hhsim_membrane::{Channel, Gate, MembraneInput, MembraneOutput, MembraneState};
use serde::Serialize;
use uom::si::{f64::Time, time::millisecond};

/// One sample of a run.
///
/// Potentials are in mV, currents in µA/cm², and time in ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Record {
    pub t: f64,
    pub v: f64,
    pub m: f64,
    pub h: f64,
    pub n: f64,
    pub i_na: f64,
    pub i_k: f64,
    pub i_l: f64,
    pub i_stim: f64,
}

impl Record {
    /// Sample time as a typed quantity.
    #[must_use]
    pub fn time(&self) -> Time {
        Time::new::<millisecond>(self.t)
    }

    #[must_use]
    pub fn state(&self) -> MembraneState {
        MembraneState {
            v: self.v,
            m: self.m,
            h: self.h,
            n: self.n,
        }
    }

    #[must_use]
    pub fn gate(&self, gate: Gate) -> f64 {
        self.state().gate(gate)
    }

    #[must_use]
    pub fn current(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Sodium => self.i_na,
            Channel::Potassium => self.i_k,
            Channel::Leak => self.i_l,
        }
    }
}

impl From<&Snapshot<MembraneInput, MembraneOutput>> for Record {
    fn from(snapshot: &Snapshot<MembraneInput, MembraneOutput>) -> Self {
        let MembraneInput { time, state, .. } = snapshot.input;
        let MembraneOutput {
            currents, stimulus, ..
        } = snapshot.output;

        Self {
            t: time,
            v: state.v,
            m: state.m,
            h: state.h,
            n: state.n,
            i_na: currents.sodium,
            i_k: currents.potassium,
            i_l: currents.leak,
            i_stim: stimulus,
        }
    }
}

/// The samples of a run in time order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    records: Vec<Record>,
}

impl Trajectory {
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|r| r.t)
    }

    pub fn voltages(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|r| r.v)
    }

    pub fn gates(&self, gate: Gate) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(move |r| r.gate(gate))
    }

    pub fn currents(&self, channel: Channel) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(move |r| r.current(channel))
    }

    pub fn stimuli(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|r| r.i_stim)
    }

    /// Records with `range.start <= t < range.end`.
    #[must_use]
    pub fn window(&self, range: Range<f64>) -> &[Record] {
        let lo = self.records.partition_point(|r| r.t < range.start);
        let hi = self.records.partition_point(|r| r.t < range.end).max(lo);
        &self.records[lo..hi]
    }

    /// Highest potential reached, or `None` if the trajectory is empty.
    #[must_use]
    pub fn peak_voltage(&self) -> Option<f64> {
        self.voltages().reduce(f64::max)
    }

    /// Times at which `V` crosses `threshold` from below.
    ///
    /// Each crossing time is interpolated linearly between the two samples
    /// that bracket it.
    #[must_use]
    pub fn spike_times(&self, threshold: f64) -> Vec<f64> {
        self.records
            .windows(2)
            .filter(|pair| pair[0].v < threshold && pair[1].v >= threshold)
            .map(|pair| {
                let (a, b) = (&pair[0], &pair[1]);
                a.t + (threshold - a.v) / (b.v - a.v) * (b.t - a.t)
            })
            .collect()
    }
}

impl FromIterator<Record> for Trajectory {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn record(t: f64, v: f64) -> Record {
        Record {
            t,
            v,
            m: 0.1,
            h: 0.6,
            n: 0.3,
            i_na: -1.0,
            i_k: 2.0,
            i_l: -0.5,
            i_stim: 0.0,
        }
    }

    fn trajectory() -> Trajectory {
        [(0.0, -65.0), (1.0, -40.0), (2.0, 20.0), (3.0, -70.0), (4.0, 10.0)]
            .into_iter()
            .map(|(t, v)| record(t, v))
            .collect()
    }

    #[test]
    fn spike_times_interpolate_upward_crossings() {
        let spikes = trajectory().spike_times(0.0);
        assert_eq!(spikes.len(), 2);
        // -40 -> 20 crosses 0 two thirds of the way from t = 1 to t = 2.
        assert_relative_eq!(spikes[0], 1.0 + 40.0 / 60.0);
        assert_relative_eq!(spikes[1], 3.0 + 70.0 / 80.0);
    }

    #[test]
    fn window_is_half_open() {
        let trajectory = trajectory();
        let window = trajectory.window(1.0..3.0);
        assert_eq!(window.len(), 2);
        assert_relative_eq!(window[0].t, 1.0);
        assert_relative_eq!(window[1].t, 2.0);
        assert!(trajectory.window(10.0..20.0).is_empty());
    }

    #[test]
    fn column_accessors() {
        let trajectory = trajectory();
        assert_eq!(trajectory.len(), 5);
        assert_eq!(trajectory.times().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(trajectory.peak_voltage().unwrap(), 20.0);
        assert!(trajectory.gates(Gate::H).all(|h| (h - 0.6).abs() < 1e-12));
        assert!(trajectory.currents(Channel::Potassium).all(|i| (i - 2.0).abs() < 1e-12));
        assert_eq!(trajectory.stimuli().count(), 5);
        assert_relative_eq!(trajectory.last().unwrap().v, 10.0);
        assert!(Trajectory::default().peak_voltage().is_none());
    }

    #[test]
    fn record_time_is_in_milliseconds() {
        use uom::si::time::second;

        assert_relative_eq!(record(250.0, 0.0).time().get::<second>(), 0.25);
    }
}
