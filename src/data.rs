use std::collections::BTreeSet;
use rustc_hash::FxHashMap;
use tracing::debug;

mod frequent;
mod tidset;

pub use frequent::{MinSupport, FrequentItem, FrequentItems, canonical_order};
pub use tidset::Tidset;

/// Atomic item label
pub type Item = String;
pub type Count = u64;
/// Ordinal position of a transaction in the input
pub type Tid = usize;
/// A transaction as handed over by the loader
pub type Transaction = BTreeSet<Item>;

pub trait Database {

    /// Number of transactions the database was built from
    fn number_transactions( &self ) -> usize;

    /// Returns the support of all transactions containing all items in the query
    fn query_support( &self, query: &[Item] ) -> Count;
}

/// Item to tidset mapping. Items that never occur are absent.
#[derive( Debug, Clone )]
pub struct VerticalDatabase {
    tidsets: FxHashMap<Item, Tidset>,
    number_transactions: usize,
}

impl Database for VerticalDatabase {

    fn number_transactions( &self ) -> usize {
	self.number_transactions
    }

    fn query_support( &self, query: &[Item] ) -> Count {
	let mut covered = Tidset::full( self.number_transactions );
	for item in query {
	    match self.tidsets.get( item ) {
		Some( tidset ) => covered = covered.intersect( tidset ),
		None => return 0,
	    }
	}
	covered.support()
    }
}

impl VerticalDatabase {

    /// Transposes the transactions: transaction `i` of the sequence becomes bit `i` in the tidset of each of its items.
    pub fn from_transactions <'a, D, T> ( data: D ) -> VerticalDatabase where
	D: IntoIterator<Item = T>,
	T: IntoIterator<Item = &'a Item>
    {
	let mut occurrences: FxHashMap<Item, Vec<Tid>> = FxHashMap::default();
	let mut number_transactions = 0;
	for (tid, transaction) in data.into_iter().enumerate() {
	    for item in transaction {
		match occurrences.get_mut( item ) {
		    Some( tids ) => tids.push( tid ),
		    None => {
			occurrences.insert( item.clone(), vec!( tid ));
		    }
		}
	    }
	    number_transactions = tid + 1;
	}

	let tidsets = occurrences.into_iter()
	    .map( |(item, tids)| {
		let tidset = Tidset::from_tids( number_transactions, tids );
		(item, tidset)
	    })
	    .collect();
	debug!( "Built vertical database of {} transactions", number_transactions );

	VerticalDatabase {
	    tidsets,
	    number_transactions,
	}
    }

    pub fn is_empty( &self ) -> bool {
	self.number_transactions == 0
    }

    /// Number of distinct items
    pub fn number_items( &self ) -> usize {
	self.tidsets.len()
    }

    pub fn tidset( &self, item: &str ) -> Option<&Tidset> {
	self.tidsets.get( item )
    }

    pub(crate) fn into_tidsets( self ) -> impl Iterator<Item = (Item, Tidset)> {
	self.tidsets.into_iter()
    }
}
