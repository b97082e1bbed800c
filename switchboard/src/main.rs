use std::path::PathBuf;
use switchboard::commands::command_argument_builder;
use switchboard::handlers::{
    MISSING_URL_MESSAGE, ScrapeOptions, handle_batch, handle_scrape, init_logging, report_error,
};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();

    init_logging(matches.get_flag("verbose"));
    let options = ScrapeOptions::from_matches(&matches);

    if let Some(sites_file) = matches.get_one::<PathBuf>("sites-file") {
        if let Err(e) = handle_batch(sites_file, &options).await {
            report_error(&e);
            std::process::exit(1);
        }
        return;
    }

    match matches.get_one::<String>("URL") {
        Some(site) => handle_scrape(site, &options).await,
        // Not an error: the result is always communicated on stdout
        None => println!("{}", MISSING_URL_MESSAGE),
    }
}
