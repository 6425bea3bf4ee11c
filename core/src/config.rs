use compact_str::CompactString;

/// Separator placed between a parent's annotation and a child's column name.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Maximum nesting depth accepted by the schema compiler.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options shared by the schema compiler, the binder and the scanner.
///
/// ```
/// use rowfold_core::ScanConfig;
///
/// let config = ScanConfig::default().with_separator("__");
/// assert_eq!(config.column_name("vehicle", "colour"), "vehicle__colour");
/// assert_eq!(config.column_name("", "id"), "id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    separator: CompactString,
    max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            separator: CompactString::const_new(DEFAULT_SEPARATOR),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: impl Into<CompactString>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Compose the full column name of `name` under `prefix`.
    pub fn column_name(&self, prefix: &str, name: &str) -> CompactString {
        if prefix.is_empty() {
            return CompactString::from(name);
        }
        let mut column =
            CompactString::with_capacity(prefix.len() + self.separator.len() + name.len());
        column.push_str(prefix);
        column.push_str(&self.separator);
        column.push_str(name);
        column
    }
}
