use crate::io::PrettyFormatter;

use super::Pattern;

/// Renders an ordered pattern list, one `{A, B} (support: s/n = p%)` line per pattern
pub struct PatternFormatter {
    number_transactions: usize,
    limit: Option<usize>,
}

impl PrettyFormatter<[Pattern]> for PatternFormatter {

    fn format_pretty( &self, patterns: &[Pattern] ) -> String {
	let limit = self.limit.unwrap_or( patterns.len() );
	let mut output = patterns.iter()
	    .take( limit )
	    .enumerate()
	    // leading newline so output begins on a new line
	    .fold( String::from( "\n" ), |mut text, (index, pattern)| {
		text += &format_pattern( index + 1, pattern, self.number_transactions );
		text.push( '\n' );
		text
	    });

	if patterns.len() > limit {
	    output += &format!( "... and {} more patterns\n", patterns.len() - limit );
	}
	output
    }
}

fn format_pattern( position: usize, pattern: &Pattern, number_transactions: usize ) -> String {
    let share = if number_transactions > 0 {
	100.0 * pattern.support() as f64 / number_transactions as f64
    } else { 0.0 };
    format!( "{position}. {{{}}} (support: {}/{number_transactions} = {share:.1}%)", pattern.join( ", " ), pattern.support() )
}

impl PatternFormatter {
    pub fn new( number_transactions: usize ) -> PatternFormatter {
	PatternFormatter{
	    number_transactions,
	    limit: None,
	}
    }

    /// Shows at most `limit` patterns
    pub fn limit( &mut self, limit: usize ) { self.limit = Some( limit ); }
}
