use clap::Parser;
use sifter::Config;
use sifter_http::serve;

#[derive(Parser)]
#[command(name = "sifter")]
struct Cli {
    #[arg(long, env = "SIFTER_BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind_addr: String,
    #[arg(long, env = "SIFTER_ES_URL", default_value = "http://127.0.0.1:9200")]
    es_url: String,
    #[arg(
        long,
        env = "SIFTER_PROFILE_URL",
        default_value = "https://www.v2ex.com/member/{username}"
    )]
    profile_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // CORS and the user-check kill switch stay env-only.
    let mut config = Config::from_env();
    config.bind_addr = cli.bind_addr;
    config.es_url = cli.es_url;
    config.profile_url_template = cli.profile_url;

    serve(config).await
}
