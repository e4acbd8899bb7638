use std::collections::{BTreeMap, BTreeSet};

use rand::prelude::*;
use rand::rngs::StdRng;

use closedmine::*;

fn transactions( data: &[&[&str]] ) -> Vec<Transaction> {
    data.iter()
	.map( |t| t.iter().map( |item| item.to_string() ).collect() )
	.collect()
}

/// Each item is drawn with its own probability so that supports differ
fn random_transactions( gen: &mut StdRng, num_transactions: usize, num_items: usize ) -> Vec<Transaction> {
    let probabilities: Vec<f64> = (0 .. num_items).map( |_| gen.gen_range( 0.2 .. 0.9 )).collect();
    (0 .. num_transactions)
	.map( |_| {
	    probabilities.iter().enumerate()
		.filter( |(_, p)| gen.gen_bool( **p ))
		.map( |(i, _)| format!( "i{i}" ))
		.collect()
	})
	.collect()
}

fn support( data: &[Transaction], itemset: &BTreeSet<Item> ) -> Count {
    data.iter().filter( |t| itemset.is_subset( t )).count() as Count
}

/// All closed frequent itemsets by enumerating every subset of the universe
fn brute_force( data: &[Transaction], min_support_count: Count ) -> BTreeMap<BTreeSet<Item>, Count> {
    let universe: Vec<Item> = data.iter().flat_map( |t| t.iter().cloned() ).collect::<BTreeSet<Item>>().into_iter().collect();
    let mut closed = BTreeMap::new();
    for mask in 1u64 .. (1 << universe.len()) {
	let itemset: BTreeSet<Item> = universe.iter().enumerate()
	    .filter( |(i, _)| mask & (1 << i) != 0 )
	    .map( |(_, item)| item.clone() )
	    .collect();
	let s = support( data, &itemset );
	if s < min_support_count {
	    continue;
	}
	let is_closed = universe.iter()
	    .filter( |item| !itemset.contains( *item ))
	    .all( |item| {
		let mut extended = itemset.clone();
		extended.insert( item.clone() );
		support( data, &extended ) < s
	    });
	if is_closed {
	    closed.insert( itemset, s );
	}
    }
    closed
}

fn as_map( patterns: &[Pattern] ) -> BTreeMap<BTreeSet<Item>, Count> {
    patterns.iter()
	.map( |p| (p.items().iter().cloned().collect(), p.support()) )
	.collect()
}

#[test]
fn test_scenario_absorbed_item() {
    let data = transactions( &[ &[ "A", "B" ], &[ "A", "B" ], &[ "A", "B", "C" ] ] );
    let patterns = mine_closed_patterns( &data, MinSupport::Count( 1 ), None ).unwrap();

    let expected = vec!(
	Pattern::new( vec!( "A".to_string(), "B".to_string(), "C".to_string() ), 1 ),
	Pattern::new( vec!( "A".to_string(), "B".to_string() ), 3 ),
    );
    assert_eq!( patterns, expected );
    assert!( !patterns.iter().any( |p| p.items() == [ "A".to_string() ] ));
}

#[test]
fn test_scenario_empty_input() {
    let data: Vec<Transaction> = Vec::new();
    let patterns = mine_closed_patterns( &data, MinSupport::Fraction( 0.1 ), None ).unwrap();
    assert!( patterns.is_empty() );
}

#[test]
fn test_scenario_fraction_out_of_range() {
    let data = transactions( &[ &[ "A" ] ] );
    let error = mine_closed_patterns( &data, MinSupport::Fraction( 1.5 ), None ).unwrap_err();
    assert!( matches!( error, MineError::Configuration { .. } ));

    let parsed: MinSupport = "1.5".parse().unwrap();
    assert!( parsed.validate().is_err() );
}

#[test]
fn test_matches_brute_force() {
    let mut gen = StdRng::seed_from_u64( 42 );
    for round in 0 .. 30 {
	let num_transactions = gen.gen_range( 1 ..= 25 );
	let num_items = gen.gen_range( 1 ..= 8 );
	let data = random_transactions( &mut gen, num_transactions, num_items );
	let min_support_count = gen.gen_range( 1 ..= 4 );

	let patterns = mine_closed_patterns( &data, MinSupport::Count( min_support_count ), None ).unwrap();
	let expected = brute_force( &data, min_support_count );

	assert_eq!( patterns.len(), expected.len(), "round {round}: duplicate or missing patterns" );
	assert_eq!( as_map( &patterns ), expected, "round {round}" );
    }
}

#[test]
fn test_pattern_properties() {
    let mut gen = StdRng::seed_from_u64( 7 );
    let data = random_transactions( &mut gen, 40, 10 );
    let database = VerticalDatabase::from_transactions( &data );
    let min_support = MinSupport::Fraction( 0.15 );
    let min_support_count = min_support.count( data.len() ).unwrap();
    let patterns = mine_closed_patterns( &data, min_support, None ).unwrap();
    assert!( !patterns.is_empty() );

    let universe: BTreeSet<Item> = data.iter().flat_map( |t| t.iter().cloned() ).collect();
    for pattern in &patterns {
	let itemset: BTreeSet<Item> = pattern.items().iter().cloned().collect();
	// support is exact and above the threshold
	assert_eq!( pattern.support(), support( &data, &itemset ));
	assert_eq!( pattern.support(), database.query_support( pattern.items() ));
	assert!( pattern.support() >= min_support_count );
	// closed: every additional item loses support
	for item in universe.iter().filter( |item| !itemset.contains( *item )) {
	    let mut extended = itemset.clone();
	    extended.insert( item.clone() );
	    assert!( support( &data, &extended ) < pattern.support() );
	}
    }

    // antichain among equal supports, monotone support along subsets
    for left in &patterns {
	for right in &patterns {
	    let left_set: BTreeSet<&Item> = left.items().iter().collect();
	    let right_set: BTreeSet<&Item> = right.items().iter().collect();
	    if left_set.len() < right_set.len() && left_set.is_subset( &right_set ) {
		assert!( left.support() > right.support() );
	    }
	}
    }
}

#[test]
fn test_deterministic_order() {
    let mut gen = StdRng::seed_from_u64( 3 );
    let data = random_transactions( &mut gen, 60, 9 );

    let first = mine_closed_patterns( &data, MinSupport::Count( 3 ), None ).unwrap();
    let second = mine_closed_patterns( &data, MinSupport::Count( 3 ), None ).unwrap();
    assert_eq!( first, second );

    // the output depends on the set of transactions only
    let mut reversed = data.clone();
    reversed.reverse();
    assert_eq!( mine_closed_patterns( &reversed, MinSupport::Count( 3 ), None ).unwrap(), first );

    for pair in first.windows( 2 ) {
	let (left, right) = (&pair[ 0 ], &pair[ 1 ]);
	assert!( left.len() > right.len()
		 || (left.len() == right.len() && left.support() > right.support())
		 || (left.len() == right.len() && left.support() == right.support() && left.items() < right.items()) );
    }
}

#[test]
fn test_cap_is_never_exceeded() {
    let mut gen = StdRng::seed_from_u64( 11 );
    let data = random_transactions( &mut gen, 50, 10 );
    let complete = mine_closed_patterns( &data, MinSupport::Count( 2 ), None ).unwrap();
    assert!( complete.len() > 5 );

    for cap in 1 ..= complete.len() + 2 {
	let mut miner = ClosedMiner::new( MinerConfig::new( MinSupport::Count( 2 )).with_max_patterns( cap ));
	let result = miner.mine( &data ).unwrap();
	assert!( result.patterns.len() <= cap, "cap {cap} exceeded" );
	if !result.statistics.stopped_early() {
	    assert_eq!( result.patterns, complete );
	}
    }
}
