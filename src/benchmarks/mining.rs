use tracing::{info, debug};
use tracing_subscriber;

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use statrs::distribution::{DiscreteUniform, Normal};

use std::time::*;

use closedmine::*;

fn main() -> Result<(), String> {
    prepare_logging();

    let small = generate_transactions( 500, 20, 5, 7 )?;
    let medium = generate_transactions( 5000, 50, 8, 11 )?;

    benchmark_thresholds( "small", &small, &[ 0.2, 0.1, 0.05, 0.02 ] )?;
    benchmark_thresholds( "medium", &medium, &[ 0.2, 0.1, 0.05 ] )?;
    benchmark_cap( "medium", &medium, 0.01, 1000 )?;

    Result::Ok( () )
}

/// Mines the same data at several thresholds. Every run is an independent invocation with its own store.
fn benchmark_thresholds( name: &str, data: &[Transaction], thresholds: &[f64] ) -> Result<(), String> {
    info!( "Start benchmark: {name} data, {} thresholds in parallel", thresholds.len() );
    let start = Instant::now();
    let runs: Vec<(f64, MiningStatistics)> = thresholds.par_iter()
	.map( |threshold| {
	    let mut miner = ClosedMiner::new( MinerConfig::new( MinSupport::Fraction( *threshold )));
	    miner.mine( data ).map( |result| (*threshold, result.statistics) )
	})
	.collect::<Result<Vec<_>, MineError>>()
	.map_err( |e| e.to_string() )?;

    for (threshold, statistics) in runs {
	info!( "Result: minsup {threshold} -> {} patterns from {} frequent items in {}ms (max length {})",
	       statistics.total_closed_patterns, statistics.frequent_items,
	       statistics.execution_time.as_millis(), statistics.max_pattern_length );
    }
    info!( "All thresholds took {}ms", start.elapsed().as_millis() );
    Ok( () )
}

fn benchmark_cap( name: &str, data: &[Transaction], threshold: f64, max_patterns: usize ) -> Result<(), String> {
    info!( "Start benchmark: {name} data capped at {max_patterns} patterns" );
    let config = MinerConfig::new( MinSupport::Fraction( threshold )).with_max_patterns( max_patterns );
    let result = ClosedMiner::new( config ).mine( data ).map_err( |e| e.to_string() )?;
    info!( "Result: {} patterns in {}ms, stopped early: {}",
	   result.patterns.len(), result.statistics.execution_time.as_millis(), result.statistics.stopped_early() );
    Ok( () )
}

/// Random transactions over `item_0 .. item_{num_items - 1}` with normally distributed lengths around `avg_length`
fn generate_transactions( num_transactions: usize, num_items: usize, avg_length: usize, seed: u64 ) -> Result<Vec<Transaction>, String> {
    let mut gen = StdRng::seed_from_u64( seed );
    let length_distribution = Normal::new( avg_length as f64, avg_length as f64 / 3.0 ).map_err( |e| e.to_string() )?;
    let mut universe: Vec<Item> = (1 ..= num_items).map( |i| format!( "item_{i}" )).collect();

    let mut transactions = Vec::with_capacity( num_transactions );
    for _ in 0 .. num_transactions {
	let length = (length_distribution.sample( &mut gen ).round() as i64).clamp( 1, num_items as i64 ) as usize;
	transactions.push( draw_transaction( &mut universe, length, &mut gen )? );
    }
    debug!( "Generated {num_transactions} transactions over {num_items} items" );
    Ok( transactions )
}

fn draw_transaction( universe: &mut [Item], length: usize, gen: &mut StdRng ) -> Result<Transaction, String> {
    let m = universe.len() as i64;
    let mut transaction = Transaction::new();
    for sample_count in 0 .. length {
	let item_dist = DiscreteUniform::new( sample_count as i64, m - 1 ).map_err( |e| e.to_string() )?;
	let i = item_dist.sample( gen ) as usize;
	transaction.insert( universe[i].clone() );
	// move i into sample count place to avoid drawing it again
	universe.swap( sample_count, i );
    }
    Ok( transaction )
}

fn prepare_logging() {
    let tracer = tracing_subscriber::fmt::fmt()
        .with_max_level( tracing_subscriber::filter::LevelFilter::INFO )
        .finish();
    if tracing::subscriber::set_global_default( tracer ).is_err() {
	eprintln!( "logging was already initialized" );
    }
}
