use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::*;

use crate::*;
use crate::pattern::order_patterns;
use crate::store::ClosedPatternStore;

mod search;

use search::PatternSearch;

pub trait Miner {
    /// Mines the transactions given in order. Transaction `i` of the sequence gets transaction id `i`.
    fn mine<'a, D, T>( &mut self, data: D ) -> Result<MiningResult, MineError> where
	D: IntoIterator<Item = T>,
	T: IntoIterator<Item = &'a Item>;
}

/// Cooperative cancellation handle, checked by the search between nodes.
#[derive( Debug, Clone, Default )]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

/// Why the search ended before exhausting the search space
#[derive( Debug, Clone, Copy, PartialEq, Eq, Serialize )]
pub enum StopReason {
    PatternLimit,
    Cancelled,
}

#[derive( Debug, Clone )]
pub struct MinerConfig {
    min_support: MinSupport,
    /// soft cap on the number of stored patterns
    max_patterns: Option<usize>,
    cancellation: Option<CancellationToken>,
}

/// Mines closed frequent itemsets by depth-first search over a vertical bit-vector database.
/// Holds only configuration, every call to `mine` starts from a fresh pattern store.
pub struct ClosedMiner {
    config: MinerConfig,
}

/// Summary of a mining run
#[derive( Debug, Clone, Serialize )]
pub struct MiningStatistics {
    pub total_transactions: usize,
    pub min_support_count: Count,
    pub frequent_items: usize,
    pub total_closed_patterns: usize,
    #[serde( serialize_with = "as_seconds" )]
    pub execution_time: Duration,
    pub avg_pattern_length: f64,
    pub max_pattern_length: usize,
    pub stop_reason: Option<StopReason>,
}

#[derive( Debug, Clone )]
pub struct MiningResult {
    /// in result order, see [`crate::pattern::result_order`]
    pub patterns: Vec<Pattern>,
    pub statistics: MiningStatistics,
}

impl Miner for ClosedMiner {

    fn mine<'a, D, T>( &mut self, data: D ) -> Result<MiningResult, MineError> where
	D: IntoIterator<Item = T>,
	T: IntoIterator<Item = &'a Item>,
    {
	let start = Instant::now();
	let mining_span = info_span!( "mining", min_support = %self.config.min_support );
	let _entered = mining_span.enter();

	// fail before touching any data
	self.config.validate()?;

	let database = VerticalDatabase::from_transactions( data );
	let number_transactions = database.number_transactions();
	let min_support_count = self.config.min_support.count( number_transactions )?;
	if database.is_empty() {
	    info!( "No transactions, nothing to mine" );
	    let statistics = MiningStatistics::new( &[], 0, min_support_count, 0, start.elapsed(), None );
	    return Ok( MiningResult{ patterns: Vec::new(), statistics } );
	}
	info!( "Minimum support count: {min_support_count}/{number_transactions}" );

	let frequent = FrequentItems::filter( database, min_support_count );
	info!( "Found {} frequent items", frequent.len() );

	let mut store = ClosedPatternStore::new();
	let stop_reason = PatternSearch::new( &frequent, &mut store )
	    .with_max_patterns( self.config.max_patterns )
	    .with_cancellation( self.config.cancellation.as_ref() )
	    .run()?;

	let mut patterns: Vec<Pattern> = store.into_entries()
	    .map( |(itemset, support)| Pattern::new( frequent.labels( itemset.iter() ), support ))
	    .collect();
	order_patterns( &mut patterns );

	let statistics = MiningStatistics::new( &patterns, number_transactions, min_support_count,
						frequent.len(), start.elapsed(), stop_reason );
	if let Some( reason ) = stop_reason {
	    warn!( "Search stopped early ({reason:?}), the result may be incomplete" );
	}
	statistics.log( "Mining complete:", Level::INFO );

	Ok( MiningResult{ patterns, statistics } )
    }
}

impl ClosedMiner {
    pub fn new( config: MinerConfig ) -> ClosedMiner {
	ClosedMiner {
	    config,
	}
    }
}

/// Mines the closed frequent itemsets of the transactions and returns them in result order.
pub fn mine_closed_patterns<'a, D, T>( data: D, min_support: MinSupport, max_patterns: Option<usize> ) -> Result<Vec<Pattern>, MineError> where
    D: IntoIterator<Item = T>,
    T: IntoIterator<Item = &'a Item>,
{
    let mut config = MinerConfig::new( min_support );
    if let Some( max ) = max_patterns {
	config = config.with_max_patterns( max );
    }
    let mut miner = ClosedMiner::new( config );
    miner.mine( data ).map( |result| result.patterns )
}

impl MinerConfig {
    pub fn new( min_support: MinSupport ) -> MinerConfig {
	MinerConfig {
	    min_support,
	    max_patterns: None,
	    cancellation: None,
	}
    }

    pub fn with_max_patterns( mut self, max_patterns: usize ) -> MinerConfig {
	self.max_patterns = Some( max_patterns );
	self
    }

    pub fn with_cancellation( mut self, token: CancellationToken ) -> MinerConfig {
	self.cancellation = Some( token );
	self
    }

    pub fn min_support( &self ) -> MinSupport {
	self.min_support
    }

    pub fn max_patterns( &self ) -> Option<usize> {
	self.max_patterns
    }

    pub fn validate( &self ) -> Result<(), MineError> {
	self.min_support.validate()?;
	if self.max_patterns == Some( 0 ) {
	    return Err( MineError::configuration( "pattern cap must be at least 1" ));
	}
	Ok( () )
    }
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
	CancellationToken::default()
    }

    pub fn cancel( &self ) {
	self.cancelled.store( true, Ordering::SeqCst );
    }

    pub fn is_cancelled( &self ) -> bool {
	self.cancelled.load( Ordering::Relaxed )
    }
}

impl MiningStatistics {

    fn new( patterns: &[Pattern], total_transactions: usize, min_support_count: Count, frequent_items: usize,
	    execution_time: Duration, stop_reason: Option<StopReason> ) -> MiningStatistics {
	let total_length: usize = patterns.iter().map( |p| p.len() ).sum();
	let avg_pattern_length = if patterns.is_empty() { 0.0 } else { total_length as f64 / patterns.len() as f64 };
	MiningStatistics {
	    total_transactions,
	    min_support_count,
	    frequent_items,
	    total_closed_patterns: patterns.len(),
	    execution_time,
	    avg_pattern_length,
	    max_pattern_length: patterns.iter().map( |p| p.len() ).max().unwrap_or( 0 ),
	    stop_reason,
	}
    }

    pub fn stopped_early( &self ) -> bool {
	self.stop_reason.is_some()
    }
}

/// Number of patterns per itemset length
pub fn length_distribution( patterns: &[Pattern] ) -> BTreeMap<usize, usize> {
    let mut distribution = BTreeMap::new();
    for pattern in patterns {
	*distribution.entry( pattern.len() ).or_insert( 0 ) += 1;
    }
    distribution
}

impl Loggable for MiningStatistics {
    fn log( &self, message: &str, level: Level ) {
	let summary = format!( "{message} {} closed patterns from {} transactions ({} frequent items, minimum support {}) in {:.3}s",
			       self.total_closed_patterns, self.total_transactions, self.frequent_items,
			       self.min_support_count, self.execution_time.as_secs_f64() );
	if level == Level::ERROR {
	    error!( "{summary}" );
	} else if level == Level::WARN {
	    warn!( "{summary}" );
	} else if level == Level::INFO {
	    info!( "{summary}" );
	} else if level == Level::DEBUG {
	    debug!( "{summary}" );
	} else {
	    trace!( "{summary}" );
	}
    }
}

fn as_seconds<S: Serializer>( duration: &Duration, serializer: S ) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64( duration.as_secs_f64() )
}
