use crate::CLAP_STYLING;
use clap::arg;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("switchboard")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("switchboard")
        .about("Finds the main phone number of a business website")
        .styles(CLAP_STYLING)
        .arg(
            arg!([URL])
                .required(false)
                .help("The web site to scrape, e.g. https://www.example.de")
                .conflicts_with("sites-file"),
        )
        .arg(
            arg!(-H --"sites-file" <PATH>)
                .required(false)
                .help("Path to a newline-delimited file of web sites to scrape one after another")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(--"json")
                .required(false)
                .help("Print the full scrape outcome as JSON (one object per line)")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-t --"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("30"),
        )
        .arg(
            arg!(-r --"retries" <NUM>)
                .required(false)
                .help("Extra attempts for a page whose request fails at the network level")
                .value_parser(clap::value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            arg!(-A --"user-agent" <USER_AGENT>)
                .required(false)
                .help("User-Agent header sent with every request"),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Log crawl progress to stderr (RUST_LOG overrides)")
                .action(clap::ArgAction::SetTrue),
        )
}
