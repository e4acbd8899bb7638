use bit_vec::BitVec;

use super::{Count, Tid};

/// Fixed-width bit vector over transaction ids.
/// Bit `i` is set iff transaction `i` contains the associated item(s).
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct Tidset {
    bits: BitVec,
}

impl Tidset {

    /// Tidset of the given width without any transaction
    pub fn empty( width: usize ) -> Tidset {
	Tidset{ bits: BitVec::from_elem( width, false ) }
    }

    /// Tidset covering every transaction `0 .. width`
    pub fn full( width: usize ) -> Tidset {
	Tidset{ bits: BitVec::from_elem( width, true ) }
    }

    /// Pre: every tid is below width
    pub fn from_tids<I: IntoIterator<Item = Tid>>( width: usize, tids: I ) -> Tidset {
	let mut tidset = Tidset::empty( width );
	for tid in tids {
	    tidset.insert( tid );
	}
	tidset
    }

    /// Pre: tid < width
    pub fn insert( &mut self, tid: Tid ) {
	self.bits.set( tid, true );
    }

    pub fn contains( &self, tid: Tid ) -> bool {
	self.bits.get( tid ).unwrap_or( false )
    }

    /// Number of transactions the bit vector spans
    pub fn width( &self ) -> usize {
	self.bits.len()
    }

    /// Population count, i.e. the number of transactions in the set
    pub fn support( &self ) -> Count {
	// bit-vec keeps the unused bits of the last block cleared
	self.bits.blocks().map( |block| block.count_ones() as Count ).sum()
    }

    /// Bitwise AND of both tidsets.
    /// Pre: both tidsets have the same width
    pub fn intersect( &self, other: &Tidset ) -> Tidset {
	let mut bits = self.bits.clone();
	bits.and( &other.bits );
	Tidset{ bits }
    }

    /// True if every transaction in self is also in other. Tidsets of different width are never subsets.
    pub fn is_subset_of( &self, other: &Tidset ) -> bool {
	self.width() == other.width() &&
	    self.bits.blocks().zip( other.bits.blocks() ).all( |(mine, theirs)| mine & !theirs == 0 )
    }

    /// Iterates the ids of all contained transactions in ascending order
    pub fn iter<'a>( &'a self ) -> impl Iterator<Item = Tid> + 'a {
	self.bits.iter().enumerate().filter( |(_, bit)| *bit ).map( |(tid, _)| tid )
    }
}
