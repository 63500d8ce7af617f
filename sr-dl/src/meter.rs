use crate::common::*;

/// Keeps track of the most recent value, the sum, the count and the average of a metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageMeter {
    val: f64,
    sum: f64,
    count: usize,
    avg: f64,
}

impl AverageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a value observed once.
    pub fn update(&mut self, val: f64) {
        self.update_n(val, 1);
    }

    /// Record a value observed `n` times, e.g. a loss averaged over a batch of `n`.
    pub fn update_n(&mut self, val: f64, n: usize) {
        if n == 0 {
            return;
        }
        self.val = val;
        self.sum += val * n as f64;
        self.count += n;
        self.avg = self.sum / self.count as f64;
    }

    /// Whether any value was recorded since the last reset.
    pub fn is_accumulating(&self) -> bool {
        self.count > 0
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn avg(&self) -> f64 {
        self.avg
    }
}

impl Display for AverageMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} ({:.4})", self.val, self.avg)
    }
}
