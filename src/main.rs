use clap::Parser;
use marketplace_page::config::cli::Command;
use marketplace_page::core::job_filter;
use marketplace_page::core::template::{load_job_cards, PageTemplate};
use marketplace_page::domain::document::Document;
use marketplace_page::domain::model::{JobFilter, RecipientId};
use marketplace_page::utils::{logger, validation::Validate};
use marketplace_page::{Cli, HttpMarketplaceApi, Page, PageConfig, PageError, PageEvent};

type CliPage = Page<HttpMarketplaceApi>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting marketplace-page CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    match run(&cli, &config).await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<PageConfig, PageError> {
    let mut config = match &cli.config {
        Some(path) => PageConfig::from_file(path)?,
        None => PageConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn new_page(document: Document, config: &PageConfig) -> CliPage {
    let api = HttpMarketplaceApi::from_config(&config.api);
    Page::with_config(document, api, config)
}

async fn run(cli: &Cli, config: &PageConfig) -> Result<(), PageError> {
    match &cli.command {
        Command::Filter {
            cards,
            category,
            min_rate,
            max_distance,
            keyword,
            sort,
            ..
        } => {
            let records = load_job_cards(cards)?;
            tracing::info!("📋 Loaded {} job cards", records.len());

            let document = PageTemplate::marketplace()
                .without_profile_form()
                .with_job_cards(records)
                .build()?;
            let mut page = new_page(document, config);
            page.on_ready()?;

            if let Some(origin) = cli.command.origin() {
                page.annotate_job_distances(origin)?;
            }
            if let Some(order) = sort {
                page.sort_jobs(*order)?;
            }

            let filter = JobFilter::from_fields(category, min_rate, max_distance, keyword);
            let visible = page.filter_jobs(&filter)?;

            for (_, card) in job_filter::visible_cards(page.document())? {
                println!(
                    "{}\t{}\t{}\t{}",
                    card.title,
                    card.category.as_deref().unwrap_or("-"),
                    card.rate.map(|r| format!("${}/hr", r)).unwrap_or_else(|| "-".to_string()),
                    card.distance
                        .map(|d| format!("{} km", d))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            println!("✅ {} job(s) match", visible);
        }
        Command::SendMessage { recipient, message } => {
            let document = PageTemplate::marketplace().build()?;
            let mut page = new_page(document, config);
            page.on_ready()?;

            let sent = page
                .send_message(RecipientId::from(recipient.as_str()), message)
                .await?;
            print_page_messages(&page);
            if !sent {
                std::process::exit(2);
            }
        }
        Command::Availability {
            date,
            slot,
            unavailable,
        } => {
            let document = PageTemplate::marketplace().build()?;
            let mut page = new_page(document, config);
            page.on_ready()?;

            let updated = page.update_availability(*date, slot, !unavailable).await?;
            print_page_messages(&page);
            if !updated {
                std::process::exit(2);
            }
        }
        Command::Preview { file } => {
            let document = PageTemplate::marketplace().build()?;
            let mut page = new_page(document, config);
            page.on_ready()?;

            let input = page
                .document()
                .query_tag("input")
                .into_iter()
                .find(|n| {
                    page.document()
                        .element(*n)
                        .map(|el| el.attribute("type") == Some("file"))
                        .unwrap_or(false)
                })
                .ok_or_else(|| PageError::element_not_found("input[type=file]"))?;
            page.document_mut()
                .element_mut(input)?
                .set_files(vec![file.clone()]);

            page.dispatch(PageEvent::Change(input)).await?;
            let preview = page.document().require_by_id("image-preview")?;
            let src = page
                .document()
                .element(preview)?
                .attribute("src")
                .unwrap_or_default();
            let prefix_len = src.find(',').map(|i| i + 1).unwrap_or(src.len());
            println!("🖼  {}… ({} bytes)", &src[..prefix_len], src.len());
        }
    }

    Ok(())
}

/// Prints the chat transcript and any notifications still on the page.
fn print_page_messages(page: &CliPage) {
    let doc = page.document();
    for class in ["message", "notification"] {
        for node in doc.query_class(class) {
            if let Ok(el) = doc.element(node) {
                println!("[{}] {}", el.classes().join(" "), el.text());
            }
        }
    }
}
