use dicom_mcp::config::Config;

#[tokio::main]
async fn main() {
    let config = match Config::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dicom_mcp::run(config).await {
        eprintln!("dicom-mcp exited with error: {:#}", e);
        std::process::exit(1);
    }
}
