use bit_set::BitSet;
use rustc_hash::FxHashMap;

use crate::Count;

/// Set of item ranks, see [`crate::FrequentItems`]
pub type Itemset = BitSet;

/// Outcome of registering an itemset with the store
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Registration {
    /// Stored; the number of equal-support subsets it replaced
    Inserted { subsumed: usize },
    /// Already stored; its support was overwritten
    Updated,
    /// Proper subset of a stored itemset with the same support, hence not closed
    Rejected,
}

/// Accepted closed itemsets with their support.
/// Invariant: the itemsets stored for one support value form an antichain.
#[derive( Debug, Default )]
pub struct ClosedPatternStore {
    supports: FxHashMap<Itemset, Count>,
    levels: FxHashMap<Count, Vec<Itemset>>,
}

fn is_proper_subset( small: &Itemset, large: &Itemset ) -> bool {
    small.len() < large.len() && small.is_subset( large )
}

impl ClosedPatternStore {

    pub fn new() -> ClosedPatternStore {
	ClosedPatternStore::default()
    }

    /// Registers an itemset unless an equal-support superset is stored, dropping the equal-support subsets it dominates.
    pub fn add( &mut self, itemset: Itemset, support: Count ) -> Registration {
	if let Some( stored ) = self.supports.get_mut( &itemset ) {
	    let previous = *stored;
	    *stored = support;
	    if previous != support {
		self.leave_level( &itemset, previous );
		self.levels.entry( support ).or_default().push( itemset );
	    }
	    return Registration::Updated;
	}

	let level = self.levels.entry( support ).or_default();
	if level.iter().any( |stored| is_proper_subset( &itemset, stored )) {
	    return Registration::Rejected;
	}

	let (dominated, kept): (Vec<Itemset>, Vec<Itemset>) = level.drain( .. )
	    .partition( |stored| is_proper_subset( stored, &itemset ));
	*level = kept;
	level.push( itemset.clone() );
	for subset in &dominated {
	    self.supports.remove( subset );
	}
	self.supports.insert( itemset, support );
	Registration::Inserted { subsumed: dominated.len() }
    }

    pub fn len( &self ) -> usize {
	self.supports.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.supports.is_empty()
    }

    /// Iterates the stored itemsets in no particular order
    pub fn iter( &self ) -> impl Iterator<Item = (&Itemset, Count)> {
	self.supports.iter().map( |(itemset, support)| (itemset, *support) )
    }

    pub fn into_entries( self ) -> impl Iterator<Item = (Itemset, Count)> {
	self.supports.into_iter()
    }

    fn leave_level( &mut self, itemset: &Itemset, support: Count ) {
	if let Some( level ) = self.levels.get_mut( &support ) {
	    level.retain( |stored| stored != itemset );
	    if level.is_empty() {
		self.levels.remove( &support );
	    }
	}
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn itemset( ranks: &[usize] ) -> Itemset {
	ranks.iter().copied().collect()
    }

    fn stored_support( store: &ClosedPatternStore, ranks: &[usize] ) -> Option<Count> {
	let wanted = itemset( ranks );
	store.iter().find( |(stored, _)| **stored == wanted ).map( |(_, support)| support )
    }

    #[test]
    fn test_rejects_subset_with_equal_support() {
	let mut store = ClosedPatternStore::new();
	assert_eq!( store.add( itemset( &[ 0, 1 ] ), 3 ), Registration::Inserted { subsumed: 0 } );
	assert_eq!( store.add( itemset( &[ 0 ] ), 3 ), Registration::Rejected );

	assert_eq!( store.len(), 1 );
	assert_eq!( stored_support( &store, &[ 0 ] ), None );
    }

    #[test]
    fn test_superset_subsumes() {
	let mut store = ClosedPatternStore::new();
	store.add( itemset( &[ 0 ] ), 3 );
	store.add( itemset( &[ 1 ] ), 3 );
	store.add( itemset( &[ 2 ] ), 2 );
	assert_eq!( store.add( itemset( &[ 0, 1 ] ), 3 ), Registration::Inserted { subsumed: 2 } );

	assert_eq!( store.len(), 2 );
	assert_eq!( stored_support( &store, &[ 0, 1 ] ), Some( 3 ));
	// other support levels are left alone
	assert_eq!( stored_support( &store, &[ 2 ] ), Some( 2 ));
    }

    #[test]
    fn test_different_support_coexists() {
	let mut store = ClosedPatternStore::new();
	store.add( itemset( &[ 0, 1 ] ), 3 );
	assert_eq!( store.add( itemset( &[ 0, 1, 2 ] ), 1 ), Registration::Inserted { subsumed: 0 } );
	assert_eq!( store.add( itemset( &[ 0 ] ), 4 ), Registration::Inserted { subsumed: 0 } );
	assert_eq!( store.len(), 3 );
    }

    #[test]
    fn test_update_moves_level() {
	let mut store = ClosedPatternStore::new();
	store.add( itemset( &[ 0, 1 ] ), 3 );
	assert_eq!( store.add( itemset( &[ 0, 1 ] ), 3 ), Registration::Updated );
	assert_eq!( store.add( itemset( &[ 0, 1 ] ), 2 ), Registration::Updated );
	assert_eq!( store.len(), 1 );
	assert_eq!( stored_support( &store, &[ 0, 1 ] ), Some( 2 ));

	// the old level no longer shadows its subsets
	assert_eq!( store.add( itemset( &[ 0 ] ), 3 ), Registration::Inserted { subsumed: 0 } );
	assert_eq!( store.add( itemset( &[ 1 ] ), 2 ), Registration::Rejected );
    }

    #[test]
    fn test_antichain_per_level() {
	let mut store = ClosedPatternStore::new();
	for ranks in vec!( vec!( 0 ), vec!( 0, 1 ), vec!( 2 ), vec!( 0, 1, 2 ), vec!( 1 ), vec!( 3, 4 )) {
	    store.add( itemset( &ranks ), 5 );
	}
	let stored: Vec<&Itemset> = store.iter().map( |(itemset, _)| itemset ).collect();
	for left in &stored {
	    for right in &stored {
		assert!( !is_proper_subset( left, right ));
	    }
	}
	assert_eq!( store.len(), 2 );
    }
}
