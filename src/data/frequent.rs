use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::MineError;

use super::{Count, Item, Tidset, VerticalDatabase};

/// Minimum support threshold, either relative to the number of transactions or absolute.
#[derive( Debug, Clone, Copy, PartialEq, Serialize )]
pub enum MinSupport {
    /// Share of transactions in (0, 1]
    Fraction( f64 ),
    /// Absolute number of transactions, at least 1
    Count( Count ),
}

/// An item that meets the minimum support, together with its tidset
#[derive( Debug, Clone )]
pub struct FrequentItem {
    item: Item,
    tidset: Tidset,
    support: Count,
}

/// Frequent items in canonical order.
/// The rank of an item is its position in this order.
#[derive( Debug )]
pub struct FrequentItems {
    items: Vec<FrequentItem>,
    min_support_count: Count,
    number_transactions: usize,
}

/// The canonical order: ascending support, ties broken by ascending label.
/// The search only extends a prefix with items of greater rank, so this comparator
/// decides which branch absorbs a closure item. Changing it changes the enumeration.
pub fn canonical_order( left: &FrequentItem, right: &FrequentItem ) -> Ordering {
    left.support.cmp( &right.support )
	.then_with( || left.item.cmp( &right.item ))
}

impl MinSupport {

    /// Checks the threshold without looking at any data
    pub fn validate( &self ) -> Result<(), MineError> {
	match *self {
	    // also rejects NaN
	    MinSupport::Fraction( fraction ) if !(fraction > 0.0 && fraction <= 1.0) =>
		Err( MineError::configuration( format!( "fractional minimum support must lie in (0, 1], got {fraction}" ))),
	    MinSupport::Count( 0 ) =>
		Err( MineError::configuration( "absolute minimum support must be at least 1" )),
	    _ => Ok( () ),
	}
    }

    /// Absolute support count for a database of the given size: `max(1, ceil(fraction * n))` or the count itself
    pub fn count( &self, number_transactions: usize ) -> Result<Count, MineError> {
	self.validate()?;
	match *self {
	    MinSupport::Fraction( fraction ) => {
		let n = number_transactions as f64;
		let mut count = (fraction * n).ceil();
		// undo representation error such as 0.3 * 10 = 3.0000000000000004, but only when
		// one transaction less still reaches the fraction exactly
		if count >= 1.0 && (count - 1.0) / n >= fraction {
		    count -= 1.0;
		}
		Ok( (count as Count).max( 1 ))
	    },
	    MinSupport::Count( count ) => Ok( count ),
	}
    }
}

impl FromStr for MinSupport {
    type Err = MineError;

    /// Numbers written with a decimal point or exponent are fractions, plain integers are counts.
    fn from_str( text: &str ) -> Result<MinSupport, MineError> {
	let text = text.trim();
	if text.contains( |c: char| c == '.' || c == 'e' || c == 'E' ) {
	    text.parse::<f64>()
		.map( MinSupport::Fraction )
		.map_err( |e| MineError::configuration( format!( "cannot parse minimum support '{text}': {e}" )))
	} else {
	    text.parse::<Count>()
		.map( MinSupport::Count )
		.map_err( |e| MineError::configuration( format!( "cannot parse minimum support '{text}': {e}" )))
	}
    }
}

impl fmt::Display for MinSupport {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
	match self {
	    MinSupport::Fraction( fraction ) => write!( f, "{:.2}%", fraction * 100.0 ),
	    MinSupport::Count( count ) => write!( f, "{count} transactions" ),
	}
    }
}

impl FrequentItem {
    pub fn item( &self ) -> &Item { &self.item }
    pub fn tidset( &self ) -> &Tidset { &self.tidset }
    pub fn support( &self ) -> Count { self.support }
}

impl FrequentItems {

    /// Drops the infrequent items and sorts the rest canonically.
    pub fn filter( database: VerticalDatabase, min_support_count: Count ) -> FrequentItems {
	let number_transactions = database.number_transactions;
	let number_items = database.number_items();
	let mut items: Vec<FrequentItem> = database.into_tidsets()
	    .map( |(item, tidset)| {
		let support = tidset.support();
		FrequentItem{ item, tidset, support }
	    })
	    .filter( |frequent| frequent.support >= min_support_count )
	    .collect();
	items.sort_unstable_by( canonical_order );

	debug!( "{} of {} items reach support {}", items.len(), number_items, min_support_count );
	FrequentItems {
	    items,
	    min_support_count,
	    number_transactions,
	}
    }

    pub fn len( &self ) -> usize {
	self.items.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.items.is_empty()
    }

    pub fn min_support_count( &self ) -> Count {
	self.min_support_count
    }

    pub fn number_transactions( &self ) -> usize {
	self.number_transactions
    }

    /// Iterates in canonical order
    pub fn iter( &self ) -> std::slice::Iter<'_, FrequentItem> {
	self.items.iter()
    }

    /// Labels of the given ranks
    pub fn labels<I: IntoIterator<Item = usize>>( &self, ranks: I ) -> Vec<Item> {
	ranks.into_iter()
	    .filter_map( |rank| self.items.get( rank ))
	    .map( |frequent| frequent.item.clone() )
	    .collect()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn database( data: &[&[&str]] ) -> VerticalDatabase {
	let data: Vec<Vec<Item>> = data.iter()
	    .map( |t| t.iter().map( |item| item.to_string() ).collect() )
	    .collect();
	VerticalDatabase::from_transactions( &data )
    }

    #[test]
    fn test_count() {
	assert_eq!( MinSupport::Fraction( 0.4 ).count( 8 ).unwrap(), 4 );
	assert_eq!( MinSupport::Fraction( 0.5 ).count( 4 ).unwrap(), 2 );
	assert_eq!( MinSupport::Fraction( 0.3 ).count( 10 ).unwrap(), 3 );
	assert_eq!( MinSupport::Fraction( 0.7 ).count( 10 ).unwrap(), 7 );
	// just above the boundary rounds up
	assert_eq!( MinSupport::Fraction( 0.3000000001 ).count( 10 ).unwrap(), 4 );
	assert_eq!( MinSupport::Fraction( 0.25000001 ).count( 4 ).unwrap(), 2 );
	assert_eq!( MinSupport::Fraction( 0.01 ).count( 10 ).unwrap(), 1 );
	assert_eq!( MinSupport::Fraction( 1.0 ).count( 7 ).unwrap(), 7 );
	// never below one
	assert_eq!( MinSupport::Fraction( 0.5 ).count( 0 ).unwrap(), 1 );
	assert_eq!( MinSupport::Count( 3 ).count( 2 ).unwrap(), 3 );
    }

    #[test]
    fn test_invalid() {
	for invalid in [ MinSupport::Fraction( 1.5 ), MinSupport::Fraction( 0.0 ),
			 MinSupport::Fraction( -0.2 ), MinSupport::Fraction( f64::NAN ),
			 MinSupport::Count( 0 ) ] {
	    assert!( matches!( invalid.validate(), Err( MineError::Configuration { .. } )));
	    assert!( matches!( invalid.count( 10 ), Err( MineError::Configuration { .. } )));
	}
    }

    #[test]
    fn test_parse() {
	assert_eq!( "0.05".parse::<MinSupport>().unwrap(), MinSupport::Fraction( 0.05 ));
	assert_eq!( "1.0".parse::<MinSupport>().unwrap(), MinSupport::Fraction( 1.0 ));
	assert_eq!( "1e-2".parse::<MinSupport>().unwrap(), MinSupport::Fraction( 0.01 ));
	assert_eq!( " 3 ".parse::<MinSupport>().unwrap(), MinSupport::Count( 3 ));
	// parses, but does not validate
	assert_eq!( "1.5".parse::<MinSupport>().unwrap(), MinSupport::Fraction( 1.5 ));
	assert!( "-3".parse::<MinSupport>().is_err() );
	assert!( "many".parse::<MinSupport>().is_err() );
    }

    #[test]
    fn test_canonical_order() {
	let database = database( &[
	    &[ "milk", "bread", "eggs" ],
	    &[ "milk", "bread" ],
	    &[ "milk", "jam" ],
	    &[ "bread", "eggs", "salt" ],
	]);
	let frequent = FrequentItems::filter( database, 2 );

	// ascending support, then ascending label
	let order: Vec<&str> = frequent.iter().map( |f| f.item().as_str() ).collect();
	assert_eq!( order, vec!( "eggs", "bread", "milk" ));
	let supports: Vec<Count> = frequent.iter().map( |f| f.support() ).collect();
	assert_eq!( supports, vec!( 2, 3, 3 ));
	assert_eq!( frequent.min_support_count(), 2 );
	assert_eq!( frequent.number_transactions(), 4 );
	assert_eq!( frequent.labels( vec!( 2, 0 )), vec!( "milk".to_string(), "eggs".to_string() ));
    }

    #[test]
    fn test_nothing_frequent() {
	let frequent = FrequentItems::filter( database( &[ &[ "A" ], &[ "B" ] ] ), 2 );
	assert!( frequent.is_empty() );
	assert_eq!( frequent.len(), 0 );
    }
}
