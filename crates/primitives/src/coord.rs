use serde::{Deserialize, Serialize};

/// Oracle-native position in line/character coordinates.
///
/// `character` counts UTF-16 code units, matching how the type-analysis
/// oracle measures columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OracleCoord {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based UTF-16 column in the line.
	pub character: u32,
}

impl OracleCoord {
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}
}

/// Display position in line/column coordinates, column measured in chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayCoord {
	/// Zero-based line index.
	pub line: usize,
	/// Zero-based char column.
	pub column: usize,
}

impl DisplayCoord {
	pub const fn new(line: usize, column: usize) -> Self {
		Self { line, column }
	}
}
