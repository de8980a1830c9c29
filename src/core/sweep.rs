use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SweepError {
    #[error("sweep axis needs at least 2 points, got {count}")]
    TooFewPoints { count: usize },
    #[error("sweep axis max ({max}) must be greater than min ({min})")]
    EmptyRange { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepAxis {
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub step: f64,
}

impl SweepAxis {
    pub fn new(min: f64, max: f64, count: usize) -> Result<Self, SweepError> {
        if count < 2 {
            return Err(SweepError::TooFewPoints { count });
        }
        if max <= min {
            return Err(SweepError::EmptyRange { min, max });
        }
        Ok(Self {
            min,
            max,
            count,
            step: count_to_step(min, max, count),
        })
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn index_for(&self, value: f64) -> usize {
        value_to_index(self.min, self.step, value)
    }
}

pub fn count_to_step(min: f64, max: f64, count: usize) -> f64 {
    (max - min) / (count - 1) as f64
}

pub fn value_to_index(min: f64, step: f64, value: f64) -> usize {
    let index = (value / step - min).floor();
    if index <= 0.0 { 0 } else { index as usize }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_divides_the_range_into_count_minus_one_intervals() {
        assert_eq!(count_to_step(0.0, 80.0, 5), 20.0);
        assert_eq!(count_to_step(0.0, 100_000.0, 101), 1_000.0);
    }

    #[test]
    fn control_values_map_to_sweep_indices() {
        assert_eq!(value_to_index(0.0, 10.0, 0.0), 0);
        assert_eq!(value_to_index(0.0, 10.0, 40.0), 4);
        assert_eq!(value_to_index(3.0, 1.0, 6.0), 3);
    }

    #[test]
    fn indices_never_go_below_zero() {
        assert_eq!(value_to_index(3.0, 10.0, 0.0), 0);
    }

    #[test]
    fn single_point_axis_is_rejected_at_setup() {
        assert_eq!(
            SweepAxis::new(0.0, 100.0, 1).unwrap_err(),
            SweepError::TooFewPoints { count: 1 }
        );
        assert_eq!(
            SweepAxis::new(0.0, 100.0, 0).unwrap_err(),
            SweepError::TooFewPoints { count: 0 }
        );
    }

    #[test]
    fn empty_range_is_rejected_at_setup() {
        assert_eq!(
            SweepAxis::new(10.0, 10.0, 5).unwrap_err(),
            SweepError::EmptyRange {
                min: 10.0,
                max: 10.0
            }
        );
        assert!(SweepAxis::new(10.0, 5.0, 5).is_err());
    }

    #[test]
    fn axis_maps_its_whole_range_onto_valid_indices() {
        let axis = SweepAxis::new(0.0, 100_000.0, 11).expect("valid axis");
        assert_eq!(axis.step, 10_000.0);
        assert_eq!(axis.index_for(0.0), 0);
        assert_eq!(axis.index_for(35_000.0), 3);
        assert_eq!(axis.index_for(100_000.0), 10);
    }

    #[test]
    fn clamp_pins_out_of_range_control_values() {
        let axis = SweepAxis::new(0.0, 100.0, 11).expect("valid axis");
        assert_eq!(axis.clamp(-5.0), 0.0);
        assert_eq!(axis.clamp(50.0), 50.0);
        assert_eq!(axis.clamp(250.0), 100.0);
    }
}
