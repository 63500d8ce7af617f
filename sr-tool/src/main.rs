use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use sr_dl::{dataset::create_data_csv, DataLists};
use sr_tool::{evaluate_bicubic, export_pairs, Config};
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Debug, Clone, Parser)]
/// Super-resolution dataset tools
enum Opts {
    /// Write train_images.json and test_images.json from image directories.
    CreateDataJson {
        #[clap(long, required = true)]
        /// training image directories
        train_dirs: Vec<PathBuf>,
        #[clap(long, required = true)]
        /// test image directories
        test_dirs: Vec<PathBuf>,
        #[clap(long, default_value = "100")]
        /// minimum width and height of kept images
        min_size: u32,
        #[clap(long, default_value = ".")]
        /// the directory where the lists are written
        output_dir: PathBuf,
    },
    /// Pair the files of a high-res and a low-res directory into a CSV file.
    CreateDataCsv {
        /// high-res image directory
        high_res_dir: PathBuf,
        /// low-res image directory
        low_res_dir: PathBuf,
        /// output CSV file
        csv_file: PathBuf,
    },
    /// Save low-res/high-res pairs of an image list as PNG files.
    ExportPairs {
        #[clap(long, default_value = "sr.json5")]
        /// configuration file
        config_file: PathBuf,
    },
    /// Report the luminance PSNR of bicubic upscaling.
    EvaluateBicubic {
        #[clap(long, default_value = "sr.json5")]
        /// configuration file
        config_file: PathBuf,
    },
}

#[tokio::main]
pub async fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    match Opts::parse() {
        Opts::CreateDataJson {
            train_dirs,
            test_dirs,
            min_size,
            output_dir,
        } => {
            let lists = tokio::task::spawn_blocking(move || -> Result<_> {
                let lists = DataLists::create(&train_dirs, &test_dirs, min_size)?;
                lists.save(&output_dir)?;
                Ok(lists)
            })
            .await??;
            info!(
                "listed {} train and {} test images",
                lists.train.len(),
                lists.test.len()
            );
        }
        Opts::CreateDataCsv {
            high_res_dir,
            low_res_dir,
            csv_file,
        } => {
            let pairs = create_data_csv(&high_res_dir, &low_res_dir, &csv_file)?;
            info!("wrote {} pairs to '{}'", pairs.len(), csv_file.display());
        }
        Opts::ExportPairs { config_file } => {
            let config = load_config(&config_file)?;
            export_pairs(config).await?;
        }
        Opts::EvaluateBicubic { config_file } => {
            let config = load_config(&config_file)?;
            let report = evaluate_bicubic(config).await?;
            println!("{}", report.psnr);
        }
    }

    Ok(())
}

fn load_config(config_file: &Path) -> Result<Arc<Config>> {
    let config = Config::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    Ok(Arc::new(config))
}
