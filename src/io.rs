use std::path::Path;
use std::fs::File;
use std::io::{BufReader, BufRead, BufWriter, Write};

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{info, Level};

use crate::*;
use crate::miner::length_distribution;

/// Converts a structure into a string
pub trait PrettyFormatter<T: ?Sized> {
    fn format_pretty( &self, object: &T ) -> String;
}

/// Controls how a flat transaction file is turned into transactions
#[derive( Debug, Clone )]
pub struct LoaderConfig {
    /// separates items on a line
    pub delimiter: String,
    /// keep only the first occurrence of identical transactions
    pub remove_duplicates: bool,
    /// drop transactions with fewer items
    pub min_length: usize,
}

/// Shape of a loaded data set
#[derive( Debug, Clone, PartialEq, Serialize )]
pub struct DatasetStatistics {
    pub num_transactions: usize,
    pub num_unique_items: usize,
    pub avg_transaction_length: f64,
    pub min_transaction_length: usize,
    pub max_transaction_length: usize,
    pub total_items: usize,
    /// share of filled cells in the transaction x item matrix
    pub density: f64,
}

impl Default for LoaderConfig {
    fn default() -> LoaderConfig {
	LoaderConfig {
	    delimiter: " ".to_string(),
	    remove_duplicates: true,
	    min_length: 1,
	}
    }
}

/// Reads one transaction per line and preprocesses them according to the configuration
pub fn load_transactions<P: AsRef<Path>>( path: P, config: &LoaderConfig ) -> Result<Vec<Transaction>, MineError> {
    let transactions = read_transactions( path, &config.delimiter )?;
    Ok( preprocess( transactions, config ))
}

/// Reads one transaction per line. Blank lines are skipped, items are trimmed and empty items dropped.
pub fn read_transactions<P: AsRef<Path>>( path: P, delimiter: &str ) -> Result<Vec<Transaction>, MineError> {
    if delimiter.is_empty() {
	return Err( MineError::configuration( "item delimiter must not be empty" ));
    }
    let path = path.as_ref();
    let file = File::open( path ).map_err( |e| MineError::io( path, e ))?;
    let reader = BufReader::new( file );

    let mut transactions = Vec::new();
    for line in reader.lines() {
	let line = line.map_err( |e| MineError::io( path, e ))?;
	if let Some( transaction ) = parse_transaction( &line, delimiter ) {
	    transactions.push( transaction );
	}
    }
    info!( "Loaded {} transactions from {}", transactions.len(), path.display() );
    Ok( transactions )
}

/// Parses items separated by the delimiter into a transaction. None for lines without items.
pub fn parse_transaction( line: &str, delimiter: &str ) -> Option<Transaction> {
    let transaction: Transaction = line.split( delimiter )
	.map( |chunk| chunk.trim() )
	.filter( |chunk| !chunk.is_empty() )
	.map( |chunk| chunk.to_string() )
	.collect();
    if transaction.is_empty() { None } else { Some( transaction ) }
}

/// Removes duplicate and short transactions, keeping the order of first occurrence
pub fn preprocess( transactions: Vec<Transaction>, config: &LoaderConfig ) -> Vec<Transaction> {
    let original_count = transactions.len();
    let mut seen: FxHashSet<Transaction> = FxHashSet::default();
    let processed: Vec<Transaction> = transactions.into_iter()
	.filter( |transaction| transaction.len() >= config.min_length )
	.filter( |transaction| !config.remove_duplicates || seen.insert( transaction.clone() ))
	.collect();
    info!( "Preprocessing: {} -> {} transactions", original_count, processed.len() );
    processed
}

impl DatasetStatistics {
    pub fn from_transactions( transactions: &[Transaction] ) -> DatasetStatistics {
	let unique: FxHashSet<&Item> = transactions.iter().flat_map( |t| t.iter() ).collect();
	let total_items: usize = transactions.iter().map( |t| t.len() ).sum();
	let num_transactions = transactions.len();
	let cells = num_transactions * unique.len();
	DatasetStatistics {
	    num_transactions,
	    num_unique_items: unique.len(),
	    avg_transaction_length: if num_transactions > 0 { total_items as f64 / num_transactions as f64 } else { 0.0 },
	    min_transaction_length: transactions.iter().map( |t| t.len() ).min().unwrap_or( 0 ),
	    max_transaction_length: transactions.iter().map( |t| t.len() ).max().unwrap_or( 0 ),
	    total_items,
	    density: if cells > 0 { total_items as f64 / cells as f64 } else { 0.0 },
	}
    }
}

impl Loggable for DatasetStatistics {
    fn log( &self, message: &str, level: Level ) {
	if level <= Level::INFO {
	    info!( "{message} {} transactions, {} unique items, length {}..{} (avg {:.2}), density {:.4}",
		   self.num_transactions, self.num_unique_items, self.min_transaction_length,
		   self.max_transaction_length, self.avg_transaction_length, self.density );
	} else {
	    tracing::debug!( "{message} {:?}", self );
	}
    }
}

/// Writes the patterns as CSV with the columns items, support and length
pub fn write_patterns_csv<P: AsRef<Path>>( path: P, patterns: &[Pattern] ) -> Result<(), MineError> {
    let path = path.as_ref();
    let file = File::create( path ).map_err( |e| MineError::io( path, e ))?;
    let mut writer = BufWriter::new( file );
    let mut write_all = || -> std::io::Result<()> {
	writeln!( writer, "items,support,length" )?;
	for pattern in patterns {
	    writeln!( writer, "{},{},{}", csv_field( &pattern.join( " " )), pattern.support(), pattern.len() )?;
	}
	writer.flush()
    };
    write_all().map_err( |e| MineError::io( path, e ))?;
    info!( "Exported {} patterns to {}", patterns.len(), path.display() );
    Ok( () )
}

/// Quotes a field if it contains a separator, quote or line break
fn csv_field( field: &str ) -> String {
    if field.contains( |c: char| c == ',' || c == '"' || c == '\n' || c == '\r' ) {
	format!( "\"{}\"", field.replace( '"', "\"\"" ))
    } else {
	field.to_string()
    }
}

/// Writes the statistics of a run as json
pub fn write_statistics<P: AsRef<Path>>( path: P, statistics: &MiningStatistics ) -> Result<(), MineError> {
    let path = path.as_ref();
    let statistics_string = serde_json::to_string_pretty( statistics )?;
    let mut file = File::create( path ).map_err( |e| MineError::io( path, e ))?;
    write!( file, "{}", statistics_string ).map_err( |e| MineError::io( path, e ))
}

/// Renders the plain text report of a run
pub fn format_report( patterns: &[Pattern], statistics: &MiningStatistics ) -> String {
    let rule = "=".repeat( 70 );
    let line = "-".repeat( 70 );
    let mut report = String::new();
    let mut push = |text: String| {
	report.push_str( &text );
	report.push( '\n' );
    };

    push( rule.clone() );
    push( "CLOSED PATTERN MINING - ANALYSIS REPORT".to_string() );
    push( rule.clone() );
    push( String::new() );

    push( "DATASET INFORMATION".to_string() );
    push( line.clone() );
    push( format!( "Total Transactions: {}", statistics.total_transactions ));
    push( format!( "Minimum Support Count: {}", statistics.min_support_count ));
    push( format!( "Frequent Items Found: {}", statistics.frequent_items ));
    push( String::new() );

    push( "PATTERN DISCOVERY RESULTS".to_string() );
    push( line.clone() );
    push( format!( "Closed Patterns Found: {}", statistics.total_closed_patterns ));
    push( format!( "Average Pattern Length: {:.2}", statistics.avg_pattern_length ));
    push( format!( "Maximum Pattern Length: {}", statistics.max_pattern_length ));
    if let Some( reason ) = statistics.stop_reason {
	push( format!( "Search Stopped Early: {:?}", reason ));
    }
    for (length, count) in length_distribution( patterns ) {
	push( format!( "  length {length}: {count} patterns" ));
    }
    push( String::new() );

    push( "PERFORMANCE METRICS".to_string() );
    push( line.clone() );
    push( format!( "Execution Time: {:.2} seconds", statistics.execution_time.as_secs_f64() ));
    push( String::new() );

    push( "TOP 10 PATTERNS BY SUPPORT".to_string() );
    push( line );
    let mut by_support: Vec<&Pattern> = patterns.iter().collect();
    // stable, so ties keep the result order
    by_support.sort_by( |left, right| right.support().cmp( &left.support() ));
    for (index, pattern) in by_support.iter().take( 10 ).enumerate() {
	push( format!( "{}. {{{}}} - Support: {}", index + 1, pattern.join( ", " ), pattern.support() ));
    }
    push( String::new() );
    push( rule );
    report
}

/// Writes the plain text report of a run
pub fn write_report<P: AsRef<Path>>( path: P, patterns: &[Pattern], statistics: &MiningStatistics ) -> Result<(), MineError> {
    let path = path.as_ref();
    let mut file = File::create( path ).map_err( |e| MineError::io( path, e ))?;
    file.write_all( format_report( patterns, statistics ).as_bytes() ).map_err( |e| MineError::io( path, e ))?;
    info!( "Generated report: {}", path.display() );
    Ok( () )
}
