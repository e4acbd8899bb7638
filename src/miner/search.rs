use tracing::{debug, trace};

use crate::*;
use crate::store::{ClosedPatternStore, Itemset, Registration};

use super::{CancellationToken, StopReason};

/// Candidate item for extending the current prefix.
/// Its tidset is already projected onto the prefix's tidset.
#[derive( Debug, Clone )]
struct Extension {
    rank: usize,
    tidset: Tidset,
    support: Count,
}

/// Depth-first enumeration of closed itemsets over the frequent items.
///
/// Every node holds a prefix, the tidset of the prefix and the candidates of greater rank.
/// Candidates covering every transaction of the prefix are absorbed into the prefix instead
/// of getting a branch of their own; the remaining candidates each spawn one child that may
/// only use candidates ranked after it. This way every itemset is reached along exactly one path.
pub(crate) struct PatternSearch<'a> {
    frequent: &'a FrequentItems,
    store: &'a mut ClosedPatternStore,
    max_patterns: Option<usize>,
    cancellation: Option<&'a CancellationToken>,
    stop: Option<StopReason>,
    nodes: u64,
}

impl <'a> PatternSearch<'a> {

    pub fn new( frequent: &'a FrequentItems, store: &'a mut ClosedPatternStore ) -> PatternSearch<'a> {
	PatternSearch {
	    frequent,
	    store,
	    max_patterns: None,
	    cancellation: None,
	    stop: None,
	    nodes: 0,
	}
    }

    pub fn with_max_patterns( mut self, max_patterns: Option<usize> ) -> PatternSearch<'a> {
	self.max_patterns = max_patterns;
	self
    }

    pub fn with_cancellation( mut self, cancellation: Option<&'a CancellationToken> ) -> PatternSearch<'a> {
	self.cancellation = cancellation;
	self
    }

    /// Explores the whole search space, or stops early at the pattern cap or on cancellation.
    pub fn run( mut self ) -> Result<Option<StopReason>, MineError> {
	let root = Itemset::with_capacity( self.frequent.len() );
	let tidset = Tidset::full( self.frequent.number_transactions() );
	let extensions: Vec<Extension> = self.frequent.iter()
	    .enumerate()
	    .map( |(rank, frequent)| Extension {
		rank,
		tidset: frequent.tidset().clone(),
		support: frequent.support(),
	    })
	    .collect();

	self.search( root, &tidset, extensions )?;
	debug!( "Visited {} search nodes", self.nodes );
	Ok( self.stop )
    }

    /// Returns whether the search may go on. Once stopped it stays stopped.
    fn checkpoint( &mut self ) -> bool {
	if self.stop.is_some() {
	    return false;
	}
	if let Some( max ) = self.max_patterns {
	    if self.store.len() >= max {
		debug!( "Pattern cap of {max} reached" );
		self.stop = Some( StopReason::PatternLimit );
		return false;
	    }
	}
	if self.cancellation.map_or( false, |token| token.is_cancelled() ) {
	    debug!( "Search cancelled" );
	    self.stop = Some( StopReason::Cancelled );
	    return false;
	}
	true
    }

    fn search( &mut self, mut prefix: Itemset, tidset: &Tidset, extensions: Vec<Extension> ) -> Result<(), MineError> {
	if !self.checkpoint() {
	    return Ok( () );
	}
	self.nodes += 1;

	let min_support_count = self.frequent.min_support_count();
	let prefix_support = tidset.support();
	let mut candidates: Vec<Extension> = Vec::with_capacity( extensions.len() );
	let mut absorbed = 0;
	for extension in extensions {
	    // the projection of a candidate onto the prefix is the candidate's tidset itself
	    if !extension.tidset.is_subset_of( tidset ) {
		return Err( MineError::invariant( format!(
		    "tidset of item rank {} is not contained in the tidset of its prefix", extension.rank )));
	    }
	    if extension.support < min_support_count {
		continue;
	    }
	    if extension.support == prefix_support {
		// occurs wherever the prefix occurs, so it belongs to every closed superset of the prefix
		prefix.insert( extension.rank );
		absorbed += 1;
	    } else {
		candidates.push( extension );
	    }
	}

	if absorbed > 0 {
	    trace!( "Absorbed {absorbed} closure items at support {prefix_support}" );
	}

	if !prefix.is_empty() {
	    match self.store.add( prefix.clone(), prefix_support ) {
		Registration::Rejected =>
		    trace!( "Rejected {:?} with support {prefix_support}: not closed", prefix ),
		Registration::Inserted { subsumed } if subsumed > 0 =>
		    trace!( "{:?} with support {prefix_support} subsumed {subsumed} patterns", prefix ),
		_ => {},
	    }
	}

	for (position, candidate) in candidates.iter().enumerate() {
	    // checked before each child, so finishing the last branch never counts as a stop
	    if !self.checkpoint() {
		break;
	    }
	    let mut child = prefix.clone();
	    child.insert( candidate.rank );
	    let child_extensions: Vec<Extension> = candidates[ position + 1 .. ].iter()
		.filter_map( |later| {
		    let projected = later.tidset.intersect( &candidate.tidset );
		    let support = projected.support();
		    if support >= min_support_count {
			Some( Extension{ rank: later.rank, tidset: projected, support })
		    } else { None }
		})
		.collect();

	    self.search( child, &candidate.tidset, child_extensions )?;
	}
	Ok( () )
    }
}
