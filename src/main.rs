use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;

use closedmine::*;
use closedmine::io::{self, DatasetStatistics, LoaderConfig, PrettyFormatter};
use closedmine::pattern::PatternFormatter;

/// Mines closed frequent itemsets from a flat transaction file.
#[derive( Parser, Debug )]
#[command( name = "miner", version, about )]
struct Arguments {
    /// One transaction per line, items separated by the delimiter
    input: PathBuf,

    /// Fraction of transactions in (0, 1] such as 0.05, or an absolute count such as 3
    #[arg( short = 's', long, default_value = "0.05" )]
    min_support: MinSupport,

    /// Separates the items of a transaction
    #[arg( short, long, default_value = " " )]
    delimiter: String,

    /// Stop the search once this many patterns are stored
    #[arg( long )]
    max_patterns: Option<usize>,

    /// Drop transactions with fewer items
    #[arg( long, default_value_t = 1 )]
    min_length: usize,

    /// Keep identical transactions instead of collapsing them
    #[arg( long )]
    keep_duplicates: bool,

    /// Write the patterns as CSV
    #[arg( short, long )]
    output: Option<PathBuf>,

    /// Write a plain text report
    #[arg( long )]
    report: Option<PathBuf>,

    /// Write run statistics as json
    #[arg( long )]
    statistics: Option<PathBuf>,

    /// Number of patterns to print
    #[arg( long, default_value_t = 10 )]
    show: usize,

    /// More output, repeat for more detail
    #[arg( short, long, action = clap::ArgAction::Count )]
    verbose: u8,
}

fn main() -> Result<(), String> {
    let arguments = Arguments::parse();
    prepare_logging( arguments.verbose )?;

    let config = {
	let mut config = MinerConfig::new( arguments.min_support );
	if let Some( max ) = arguments.max_patterns {
	    config = config.with_max_patterns( max );
	}
	config
    };
    // reject bad thresholds before reading the data
    config.validate().map_err( |e| e.to_string() )?;
    match config.max_patterns() {
	Some( max ) => info!( "Minimum support {}, at most {max} patterns", config.min_support() ),
	None => info!( "Minimum support {}", config.min_support() ),
    }

    let loader = LoaderConfig {
	delimiter: arguments.delimiter.clone(),
	remove_duplicates: !arguments.keep_duplicates,
	min_length: arguments.min_length,
    };
    let transactions = io::load_transactions( &arguments.input, &loader ).map_err( |e| e.to_string() )?;
    DatasetStatistics::from_transactions( &transactions ).log( "Dataset:", Level::INFO );

    let mut miner = ClosedMiner::new( config );
    let result = miner.mine( &transactions ).map_err( |e| e.to_string() )?;

    let mut formatter = PatternFormatter::new( result.statistics.total_transactions );
    formatter.limit( arguments.show );
    info!( "Closed frequent patterns: {}", formatter.format_pretty( result.patterns.as_slice() ));
    if let Some( longest ) = result.patterns.first() {
	longest.log( "Longest pattern:", Level::DEBUG );
    }

    if let Some( path ) = &arguments.output {
	io::write_patterns_csv( path, &result.patterns ).map_err( |e| e.to_string() )?;
    }
    if let Some( path ) = &arguments.report {
	io::write_report( path, &result.patterns, &result.statistics ).map_err( |e| e.to_string() )?;
    }
    if let Some( path ) = &arguments.statistics {
	io::write_statistics( path, &result.statistics ).map_err( |e| e.to_string() )?;
    }

    Ok( () )
}

fn prepare_logging( verbosity: u8 ) -> Result<(), String> {
    let level = match verbosity {
	0 => LevelFilter::INFO,
	1 => LevelFilter::DEBUG,
	_ => LevelFilter::TRACE,
    };
    let tracer = tracing_subscriber::fmt::fmt()
        .with_max_level( level )
        .finish();
    tracing::subscriber::set_global_default( tracer ).map_err( |e| e.to_string() )
}
