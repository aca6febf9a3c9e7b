use campus_market::infra::config::{AppConfig, StoreBackend};
use campus_market::storage::{self, UploadStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Requires env vars:\n\
           JWT_SECRET, and DATABASE_URL when STORE_BACKEND=postgres (the default)\n\
         Optional:\n\
           BIND_ADDR, STORE_BACKEND, DB_MAX_CONNECTIONS, TOKEN_TTL_HOURS,\n\
           UPLOAD_DIR, PUBLIC_BASE_URL, MAX_UPLOAD_BYTES\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing)
    let config = AppConfig::from_env()?;

    println!("> Preflight:");
    println!("  BIND_ADDR={}", config.bind_addr);
    println!("  STORE_BACKEND={:?}", config.store_backend);
    println!("  UPLOAD_DIR={}", config.upload_dir.display());
    println!("  TOKEN_TTL_HOURS={}", config.token_ttl_hours);
    println!("  MAX_UPLOAD_BYTES={}", config.max_upload_bytes);
    match &config.public_base_url {
        Some(url) => println!("  PUBLIC_BASE_URL={}", url),
        None => println!("  PUBLIC_BASE_URL unset (image URLs follow the Host header)"),
    }
    if config.store_backend == StoreBackend::Memory {
        eprintln!("  Warning: memory backend selected; data is lost on restart.");
    }

    let uploads = UploadStore::prepare(&config.upload_dir).await?;
    uploads.probe_writable().await?;
    println!("  Upload directory is writable.");

    let store = storage::connect(&config).await?;
    store
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("Store is not reachable: {}", e))?;
    println!("  Store is reachable; schema is in place.");

    println!("> Preflight OK.");
    Ok(())
}
