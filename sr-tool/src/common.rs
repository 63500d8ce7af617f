pub use anyhow::{Context, Result};
pub use futures::stream::{self, StreamExt};
pub use image::{imageops::FilterType, RgbImage};
pub use log::{debug, info, warn};
pub use par_stream::prelude::*;
pub use rand::{rngs::StdRng, SeedableRng};
pub use serde::{Deserialize, Serialize};
pub use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
pub use tch::Device;
