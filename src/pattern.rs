mod serialize; // pretty printing of pattern lists

use std::cmp::Ordering;

use serde::Serialize;
use tracing::Level;

use crate::{Count, Item, Loggable};

pub use serialize::PatternFormatter;

/// A closed itemset and the number of transactions containing it
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize )]
pub struct Pattern {
    /// sorted ascending
    items: Vec<Item>,
    support: Count,
}

impl Pattern {

    pub fn new<I: IntoIterator<Item = Item>>( items: I, support: Count ) -> Pattern {
	let mut items: Vec<Item> = items.into_iter().collect();
	items.sort();
	items.dedup();
	Pattern{ items, support }
    }

    /// Sorted item labels
    pub fn items( &self ) -> &[Item] {
	&self.items
    }

    pub fn support( &self ) -> Count {
	self.support
    }

    pub fn len( &self ) -> usize {
	self.items.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.items.is_empty()
    }

    /// Items joined by the separator, in sorted order
    pub fn join( &self, separator: &str ) -> String {
	self.items.join( separator )
    }
}

/// Result order: longer itemsets first, then higher support, then sorted labels ascending
pub fn result_order( left: &Pattern, right: &Pattern ) -> Ordering {
    right.len().cmp( &left.len() )
	.then_with( || right.support.cmp( &left.support ))
	.then_with( || left.items.cmp( &right.items ))
}

/// Sorts patterns into the deterministic result order, independent of their current order
pub fn order_patterns( patterns: &mut [Pattern] ) {
    patterns.sort_by( result_order );
}

impl Loggable for Pattern {
    fn log( &self, message: &str, level: Level ) {
	let items = self.join( ", " );
	if level == Level::ERROR {
	    tracing::error!( support = self.support, "{message} {{{items}}}" );
	} else if level == Level::WARN {
	    tracing::warn!( support = self.support, "{message} {{{items}}}" );
	} else if level == Level::INFO {
	    tracing::info!( support = self.support, "{message} {{{items}}}" );
	} else if level == Level::DEBUG {
	    tracing::debug!( support = self.support, "{message} {{{items}}}" );
	} else {
	    tracing::trace!( support = self.support, "{message} {{{items}}}" );
	}
    }
}
