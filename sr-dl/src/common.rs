pub use crate::error::{Error, Result};
pub use image::{imageops::FilterType, RgbImage};
pub use itertools::Itertools as _;
pub use log::{debug, info, warn};
pub use once_cell::sync::OnceCell;
pub use rand::prelude::*;
pub use serde::{
    de::Error as _, Deserialize, Deserializer, Serialize, Serializer,
};
pub use std::{
    convert::TryFrom,
    fmt::{self, Debug, Display},
    fs,
    io,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
pub use tch::{Device, Kind, Reduction, Tensor};
pub use tch_tensor_like::TensorLike;
