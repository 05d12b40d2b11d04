use clap::Parser;

/// This program drives the tally of a batch of elections and post-processes the results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) JSON description of the pipeline: the list of election jobs and the batch
    /// options. Each job names its extraction directory and the file name of its result output.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (directory path, default '.') The directory in which the result files will be written.
    /// Output names from the pipeline description are reduced to their file name inside it.
    #[clap(short, long, value_parser)]
    pub out_dir: Option<String>,

    /// (file path) A reference results file in JSON format. If provided, tally-pipes will
    /// check that the first written output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, the parsed ballots will be echoed as CSV lines to the
    /// standard output while tallying. Overrides the pipeline description.
    #[clap(long, takes_value = false)]
    pub print_as_csv: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
