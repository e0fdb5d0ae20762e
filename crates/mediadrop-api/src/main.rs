use mediadrop_core::Config;

// mimalloc keeps fragmentation low under many concurrent streaming uploads,
// especially on musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = mediadrop_api::setup::initialize_app(config.clone()).await?;

    mediadrop_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
