use std::any::Any;
use std::fmt;

use super::{DataSourceError, Frame, ProfileName};

/// Provider of profile values per time step
///
/// A data source owns its buffer. `duplicate` must return an instance with an
/// independent buffer; network copies rely on it.
pub trait DataSource: fmt::Debug + Send + Sync + 'static {
    /// Value of `profile` at `time_step`
    fn time_step_value(&self, time_step: usize, profile: &ProfileName) -> Result<f64, DataSourceError>;

    /// Number of time steps available
    fn time_steps(&self) -> usize;

    fn buffer(&self) -> &Frame;

    fn buffer_mut(&mut self) -> &mut Frame;

    fn duplicate(&self) -> Box<dyn DataSource>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn DataSource> {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

/// Data source backed by an in-memory [`Frame`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameData {
    frame: Frame,
}

impl FrameData {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }
}

impl DataSource for FrameData {
    fn time_step_value(&self, time_step: usize, profile: &ProfileName) -> Result<f64, DataSourceError> {
        self.frame.get(time_step, profile)
    }

    fn time_steps(&self) -> usize {
        self.frame.len()
    }

    fn buffer(&self) -> &Frame {
        &self.frame
    }

    fn buffer_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    fn duplicate(&self) -> Box<dyn DataSource> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_owns_its_buffer() {
        let original: Box<dyn DataSource> = Box::new(FrameData::new(
            Frame::from_rows(vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]).unwrap(),
        ));
        let mut copy = original.clone();

        assert!(!std::ptr::eq(original.buffer(), copy.buffer()));
        copy.buffer_mut().set(0, &ProfileName::Index(0), 9.0).unwrap();

        assert_eq!(original.time_step_value(0, &ProfileName::Index(0)).unwrap(), 0.0);
        assert_eq!(copy.time_step_value(0, &ProfileName::Index(0)).unwrap(), 9.0);
        assert_eq!(copy.time_steps(), 2);
        assert!(copy.as_any().downcast_ref::<FrameData>().is_some());
    }
}
