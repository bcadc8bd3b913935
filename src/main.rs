use clap::error::ErrorKind;
use clap::Parser;
use geocode_etl::utils::{error::ErrorCategory, logger, validation::Validate};
use geocode_etl::{CliConfig, EtlEngine, EtlError, GeocodePipeline, LocalStorage};

fn fail(e: EtlError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    match e.category() {
        ErrorCategory::Usage => println!("{}", e.user_friendly_message()),
        _ => eprintln!("❌ {}", e.user_friendly_message()),
    }
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match CliConfig::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            logger::init_cli_logger(false);
            fail(EtlError::Usage {
                message: e.to_string().trim_end().to_string(),
            })
        }
    };

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI arguments: {:?}", cli);

    let config = cli.resolve().unwrap_or_else(|e| fail(e));
    if let Err(e) = config.validate() {
        fail(e);
    }
    tracing::debug!("Resolved configuration: {:?}", config);

    let pipeline =
        GeocodePipeline::new(LocalStorage::default(), config).unwrap_or_else(|e| fail(e));
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            println!(
                "Successfully geocoded {} of {} addresses",
                summary.geocoded, summary.rows_written
            );
            println!("Output written to: {}", summary.output_path);
        }
        Err(e) => fail(e),
    }

    Ok(())
}
