use clap::Parser;
use sensei_search::backend::HttpBackend;
use sensei_search::cli::{Cli, Commands};
use sensei_search::config::Config;
use sensei_search::error::Result;
use sensei_search::search::{SearchMode, SearchSession};
use sensei_search::session;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Image { file } => {
            println!("📸 sensei-search - 画像検索\n");

            let backend = build_backend(&config, cli.backend_url.as_deref())?;
            let mut search = SearchSession::new(backend)?;

            println!("[1/2] 検索とサムネイル取得中...");
            let outcome = search.search_by_image(Some(&file)).await;

            println!("[2/2] 結果表示\n");
            session::print_report(&mut search, SearchMode::Image, outcome, &config, cli.verbose);
        }

        Commands::Text { query } => {
            println!("🔍 sensei-search - テキスト検索\n");

            let backend = build_backend(&config, cli.backend_url.as_deref())?;
            let mut search = SearchSession::new(backend)?;

            println!("[1/2] 検索とサムネイル取得中...");
            let outcome = search.search_by_text(&query).await;

            println!("[2/2] 結果表示\n");
            session::print_report(&mut search, SearchMode::Text, outcome, &config, cli.verbose);
        }

        Commands::Session => {
            let backend = build_backend(&config, cli.backend_url.as_deref())?;
            session::run_session(&config, backend, cli.verbose).await?;
        }

        Commands::Config { set_backend_url, show } => {
            let mut config = config;

            if let Some(url) = set_backend_url {
                config.set_backend_url(url)?;
                println!("✔ バックエンドURLを設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  バックエンドURL: {}",
                    config.backend_url.as_deref().unwrap_or("未設定")
                );
                println!("  OODレンジ: {} 〜 {}", config.ood_min, config.ood_max);
                println!(
                    "  ngrokヘッダ: {}",
                    if config.ngrok_skip_header { "付与" } else { "なし" }
                );
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}

fn build_backend(config: &Config, cli_override: Option<&str>) -> Result<HttpBackend> {
    let base_url = config.resolve_backend_url(cli_override)?;
    HttpBackend::new(base_url, config)
}
