use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing::{info, warn};

use mp4_labeler::api::start_http_server;
use mp4_labeler::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("mp4-labeler")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Web-based annotation tool for labeling instructional video tutorials")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port for the web server")
                .default_value("8080"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "mp4_labeler=debug,info"
        } else {
            "mp4_labeler=info,warn"
        })
        .init();

    let port: u16 = matches
        .get_one::<String>("port")
        .map(String::as_str)
        .unwrap_or("8080")
        .parse()?;

    let (config, config_path) = match matches.get_one::<String>("config") {
        Some(path) => {
            let path = PathBuf::from(path);
            (Config::load_from(&path)?, path)
        }
        None => Config::load(),
    };

    info!("mp4-labeler starting");
    if config.video_dir.as_os_str().is_empty() {
        warn!("No video directory configured yet; set one from the web UI");
    } else {
        info!("Video directory: {}", config.video_dir.display());
    }
    info!("Output directory: {}", config.output_dir.display());
    if let Some(pre_dir) = &config.pre_annotation_dir {
        info!("Pre-annotation directory: {}", pre_dir.display());
    }
    if let Some(task_file) = &config.task_file {
        info!("Task file: {}", task_file.display());
    }

    start_http_server(config, config_path, port).await
}
