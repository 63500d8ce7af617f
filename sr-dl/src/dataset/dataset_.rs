use crate::{common::*, transform::SamplePair};

/// The dataset that can be random accessed.
pub trait RandomAccessDataset
where
    Self: Debug + Send + Sync,
{
    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth sample pair using the given random number generator.
    fn nth_with_rng(&self, index: usize, rng: &mut dyn RngCore) -> Result<SamplePair>;

    /// Get the nth sample pair.
    fn nth(&self, index: usize) -> Result<SamplePair> {
        self.nth_with_rng(index, &mut rand::thread_rng())
    }
}

pub(crate) fn ensure_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::IndexOutOfRange { index, len });
    }
    Ok(())
}
